//! Address and range parsing
//!
//! An address is one token resolving to a 0-based line index: `/re/`, `?re?`,
//! `^`, `$`, `.`, a 1-based line number or a `+n`/`-n` offset from the
//! current line. A range is one address, or two separated by `,`.
//!
//! Resolution works on signed indices. Values outside the buffer are only
//! rejected by [`validate_range`], after the whole range has been read.

use crate::buffer::{Buffer, Range};
use crate::context::EditContext;
use crate::error::{EdError, EdResult};

/// Which end of a range an address is being resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSlot {
    First,
    /// Searches start from the first address rather than from dot
    Second { first: isize },
}

/// Result of parsing the address prefix of a command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedRange<'a> {
    pub first: isize,
    pub last: isize,
    /// True when the command text carried any address at all
    pub explicit: bool,
    pub rest: &'a str,
}

/// Text between two delimiters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Delimited<'a> {
    pub body: &'a str,
    pub rest: &'a str,
    pub terminated: bool,
}

/// Split `text` (which starts just after an opening `delim`) at the next
/// unescaped `delim`. Without a closing delimiter the whole text is the body.
pub(crate) fn split_delimited(text: &str, delim: char) -> Delimited<'_> {
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == delim {
            return Delimited {
                body: &text[..i],
                rest: &text[i + c.len_utf8()..],
                terminated: true,
            };
        }
    }
    Delimited {
        body: text,
        rest: "",
        terminated: false,
    }
}

/// Turn `\<delim>` back into `<delim>` unless the delimiter means something
/// to the regex engine, in which case the escape is what the user wants.
pub(crate) fn pattern_body(body: &str, delim: char) -> String {
    let as_str = delim.to_string();
    if regex::escape(&as_str) != as_str {
        return body.to_string();
    }
    unescape_delimiter(body, delim)
}

pub(crate) fn unescape_delimiter(text: &str, delim: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&delim) {
            continue;
        }
        out.push(c);
    }
    out
}

/// Leading decimal digits of `text`, if any
pub(crate) fn consume_number(text: &str) -> EdResult<(Option<isize>, &str)> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if end == 0 {
        return Ok((None, text));
    }
    let n = text[..end].parse::<isize>().map_err(|_| EdError::BadRange)?;
    Ok((Some(n), &text[end..]))
}

/// Resolve one address at the start of `text`.
///
/// Returns `None` for the index when no address token is present; the caller
/// picks the default for the slot.
pub fn resolve_address<'a>(
    text: &'a str,
    slot: AddressSlot,
    ctx: &mut EditContext,
) -> EdResult<(Option<isize>, &'a str)> {
    let dot = ctx.buffer.dot() as isize;
    let Some(c) = text.chars().next() else {
        return Ok((None, text));
    };
    let after = &text[c.len_utf8()..];

    match c {
        '/' | '?' => {
            let start = match slot {
                AddressSlot::First => dot,
                AddressSlot::Second { first } => first,
            };
            let delimited = split_delimited(after, c);
            if !delimited.terminated {
                return Err(EdError::BadRegex("unterminated pattern".to_string()));
            }
            let re = ctx.pattern_or_last(&pattern_body(delimited.body, c))?;
            if start < 0 || start > ctx.buffer.last_index().max(0) {
                return Err(EdError::BadRange);
            }
            let found = if c == '/' {
                ctx.buffer.search_forward(&re, start as usize)
            } else {
                ctx.buffer.search_backward(&re, start as usize)
            };
            match found {
                Some(line) => {
                    tracing::debug!(pattern = re.as_str(), line, "address search hit");
                    Ok((Some(line as isize), delimited.rest))
                }
                None => Err(EdError::NoMatch),
            }
        }
        '^' => Ok((Some(0), after)),
        // a leading comma stands for "first line"; the range parser consumes it
        ',' if slot == AddressSlot::First => Ok((Some(0), text)),
        '$' => Ok((Some(ctx.buffer.last_index()), after)),
        '.' => Ok((Some(dot), after)),
        '0'..='9' => {
            let (n, rest) = consume_number(text)?;
            Ok((n.map(|n| n - 1), rest))
        }
        '+' | '-' => {
            let (n, rest) = consume_number(after)?;
            let magnitude = n.unwrap_or(1);
            let offset = if c == '-' {
                magnitude.checked_neg().ok_or(EdError::BadRange)?
            } else {
                magnitude
            };
            let line = dot.checked_add(offset).ok_or(EdError::BadRange)?;
            Ok((Some(line), rest))
        }
        _ => Ok((None, text)),
    }
}

/// Parse `[addr1][,addr2]` from the front of a command line
pub fn parse_range<'a>(text: &'a str, ctx: &mut EditContext) -> EdResult<ParsedRange<'a>> {
    let (first, rest) = resolve_address(text, AddressSlot::First, ctx)?;
    let explicit = first.is_some();
    let first = first.unwrap_or(ctx.buffer.dot() as isize);

    if let Some(after_comma) = rest.strip_prefix(',') {
        let (last, rest) = resolve_address(after_comma, AddressSlot::Second { first }, ctx)?;
        let last = last.unwrap_or(ctx.buffer.last_index());
        return Ok(ParsedRange {
            first,
            last,
            explicit: true,
            rest,
        });
    }

    Ok(ParsedRange {
        first,
        last: first,
        explicit,
        rest,
    })
}

/// Check a resolved pair of indices against the buffer
pub fn validate_range(first: isize, last: isize, buffer: &Buffer) -> EdResult<Range> {
    if first < 0 || last < 0 || first > last {
        return Err(EdError::BadRange);
    }
    let num_lines = buffer.num_lines() as isize;
    if (num_lines > 0 && last > num_lines - 1) || (num_lines == 0 && last > 0) {
        return Err(EdError::BadRange);
    }
    Ok(Range::new(first as usize, last as usize))
}

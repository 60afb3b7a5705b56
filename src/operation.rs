//! Operation letters and their arguments
//!
//! The operation parser reads the text after the address prefix and produces
//! an [`Operation`]. `s` delegates to [`Substitution::parse`]; `g` and `v`
//! call back into [`parse_operation`] for their subcommand.

use crate::address::{pattern_body, resolve_address, split_delimited, AddressSlot};
use crate::context::EditContext;
use crate::error::{EdError, EdResult};
use crate::substitute::Substitution;
use regex::Regex;
use std::path::PathBuf;

/// Where text read by `a`, `i` and `c` goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// i - before the first addressed line
    Insert,
    /// a - after the last addressed line
    Append,
    /// c - in place of the addressed lines
    Change,
}

/// g/v: run a per-line operation on lines that match (or don't)
#[derive(Debug, Clone)]
pub struct Glob {
    pub pattern: Regex,
    /// true for `g`, false for `v`
    pub matching: bool,
    pub command: Box<Operation>,
}

impl Glob {
    pub fn selects(&self, line: &str) -> bool {
        self.pattern.is_match(line) == self.matching
    }
}

#[derive(Debug, Clone)]
pub enum Operation {
    Print,
    PrintNumbered,
    Delete,
    Substitute(Substitution),
    /// Move the range after `destination`; -1 means before the first line
    Move { destination: isize },
    Input(InputMode),
    Global(Glob),
    Read { path: PathBuf },
    Write { path: PathBuf },
    Quit,
    Nop,
}

impl Operation {
    /// Operations that act on each addressed line independently
    pub fn is_per_line(&self) -> bool {
        matches!(
            self,
            Operation::Print | Operation::PrintNumbered | Operation::Delete | Operation::Substitute(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Print => "print",
            Operation::PrintNumbered => "print-numbered",
            Operation::Delete => "delete",
            Operation::Substitute(_) => "substitute",
            Operation::Move { .. } => "move",
            Operation::Input(InputMode::Insert) => "insert",
            Operation::Input(InputMode::Append) => "append",
            Operation::Input(InputMode::Change) => "change",
            Operation::Global(_) => "global",
            Operation::Read { .. } => "read",
            Operation::Write { .. } => "write",
            Operation::Quit => "quit",
            Operation::Nop => "nop",
        }
    }
}

/// Parse one operation from the front of `text`.
///
/// Empty text means `p`. Returns the operation and whatever text it did not
/// consume.
pub fn parse_operation<'a>(
    text: &'a str,
    ctx: &mut EditContext,
) -> EdResult<(Operation, &'a str)> {
    let Some(c) = text.chars().next() else {
        return Ok((Operation::Print, text));
    };
    let args = &text[c.len_utf8()..];

    let parsed = match c {
        'n' => (Operation::PrintNumbered, args),
        'p' => (Operation::Print, args),
        'd' => (Operation::Delete, args),
        'q' => {
            if ctx.buffer.is_dirty() {
                return Err(EdError::DirtyBufferGuard);
            }
            (Operation::Quit, args)
        }
        'Q' => (Operation::Quit, args),
        'r' => {
            let path = filename_argument(c, args, ctx)?;
            if ctx.buffer.is_dirty() {
                return Err(EdError::DirtyBufferGuard);
            }
            (Operation::Read { path }, "")
        }
        'w' => {
            let path = filename_argument(c, args, ctx)?;
            (Operation::Write { path }, "")
        }
        's' => (Operation::Substitute(Substitution::parse(args, ctx)?), ""),
        'a' => (Operation::Input(InputMode::Append), args),
        'i' => (Operation::Input(InputMode::Insert), args),
        'c' => (Operation::Input(InputMode::Change), args),
        'm' => {
            let (destination, rest) = resolve_address(args, AddressSlot::First, ctx)?;
            let destination = destination.ok_or(EdError::BadMoveTarget)?;
            (Operation::Move { destination }, rest)
        }
        'g' | 'v' => parse_global(c, args, ctx)?,
        other => return Err(EdError::unrecognized(other)),
    };

    tracing::debug!(operation = parsed.0.name(), "parsed operation");
    Ok(parsed)
}

/// `r`/`w` take an optional space-separated filename, defaulting to the
/// buffer's own
fn filename_argument(command: char, args: &str, ctx: &EditContext) -> EdResult<PathBuf> {
    if !args.is_empty() && !args.starts_with(char::is_whitespace) {
        return Err(EdError::UnrecognizedCommand(format!(
            "{}: invalid command suffix",
            command
        )));
    }
    let name = args.trim();
    if !name.is_empty() {
        return Ok(PathBuf::from(name));
    }
    ctx.buffer
        .filename()
        .map(PathBuf::from)
        .ok_or(EdError::MissingFilename)
}

fn parse_global<'a>(
    command: char,
    args: &'a str,
    ctx: &mut EditContext,
) -> EdResult<(Operation, &'a str)> {
    let Some(delim) = args.chars().next() else {
        return Err(EdError::UnrecognizedCommand(format!(
            "no pattern supplied for {}//",
            command
        )));
    };
    let delimited = split_delimited(&args[delim.len_utf8()..], delim);
    if !delimited.terminated {
        return Err(EdError::BadRegex("unterminated pattern".to_string()));
    }
    let pattern = ctx.resolve_pattern(&pattern_body(delimited.body, delim))?;
    if delimited.rest.is_empty() {
        return Err(EdError::UnrecognizedCommand(format!(
            "no command supplied for {}//",
            command
        )));
    }

    // the subcommand sees this pattern as the last one, so `g/x/s//y/` works;
    // a rejected subcommand puts the old one back
    let previous = ctx.replace_search(Some(pattern.clone()));
    let (sub, rest) = match parse_operation(delimited.rest, ctx) {
        Ok((sub, rest)) if sub.is_per_line() => (sub, rest),
        Ok(_) => {
            ctx.replace_search(previous);
            let letter = delimited.rest.chars().next().unwrap_or(command);
            return Err(EdError::UnrecognizedCommand(format!(
                "can't use '{}' with {}//",
                letter, command
            )));
        }
        Err(e) => {
            ctx.replace_search(previous);
            return Err(e);
        }
    };

    Ok((
        Operation::Global(Glob {
            pattern,
            matching: command == 'g',
            command: Box::new(sub),
        }),
        rest,
    ))
}

//! The `s` command: argument parsing and the per-line replacement engine

use crate::address::{pattern_body, split_delimited, unescape_delimiter};
use crate::context::EditContext;
use crate::error::{EdError, EdResult};
use regex::Regex;

/// Options used when a substitution supplies none: replace the first match
/// and print the result
pub const DEFAULT_OPTIONS: &str = "1p";

/// Which matches to replace, and whether to print the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubstituteOptions {
    /// g - every match
    pub global: bool,
    /// p - print the line after substitution
    pub print: bool,
    /// 1-9 - individual matches, 0-based here
    occurrences: [bool; 9],
}

impl SubstituteOptions {
    pub fn parse(options: &str) -> EdResult<Self> {
        let mut parsed = Self::default();
        for c in options.chars() {
            match c {
                'g' => parsed.global = true,
                'p' => parsed.print = true,
                '1'..='9' => parsed.occurrences[c as usize - '1' as usize] = true,
                c if c.is_whitespace() => {}
                other => {
                    return Err(EdError::UnrecognizedCommand(format!(
                        "{}: unknown substitute option",
                        other
                    )));
                }
            }
        }
        Ok(parsed)
    }

    /// Whether the match at 0-based `index` gets replaced
    pub fn selects(&self, index: usize) -> bool {
        self.global || self.occurrences.get(index).copied().unwrap_or(false)
    }
}

/// A parsed `s` command
#[derive(Debug, Clone)]
pub struct Substitution {
    pub pattern: Regex,
    pub replacement: String,
    pub options: SubstituteOptions,
}

impl Substitution {
    /// Parse the arguments following `s`.
    ///
    /// On success the pattern, replacement and options become the context's
    /// "last" values; on failure the context is left alone.
    pub fn parse(args: &str, ctx: &mut EditContext) -> EdResult<Self> {
        let Some(delim) = args.chars().next() else {
            return Self::repeat_last(ctx);
        };

        let delimited = split_delimited(&args[delim.len_utf8()..], delim);
        let pattern = ctx.resolve_pattern(&pattern_body(delimited.body, delim))?;

        let (raw_replacement, options) = if delimited.terminated {
            let repl = split_delimited(delimited.rest, delim);
            let options = if repl.terminated && !repl.rest.trim().is_empty() {
                repl.rest
            } else {
                DEFAULT_OPTIONS
            };
            (repl.body, options)
        } else {
            ("", DEFAULT_OPTIONS)
        };

        let replacement = if raw_replacement == "%" {
            ctx.last_replacement()
                .ok_or(EdError::NoPriorReplacement)?
                .to_string()
        } else {
            unescape_delimiter(raw_replacement, delim)
        };
        let parsed_options = SubstituteOptions::parse(options)?;

        ctx.remember_search(pattern.clone());
        ctx.remember_substitution(&replacement, options);
        tracing::debug!(
            pattern = pattern.as_str(),
            replacement = %replacement,
            options,
            "parsed substitution"
        );

        Ok(Self {
            pattern,
            replacement,
            options: parsed_options,
        })
    }

    /// Bare `s`: reuse the last pattern, replacement and options
    fn repeat_last(ctx: &mut EditContext) -> EdResult<Self> {
        let pattern = ctx.last_search().cloned().ok_or(EdError::NoPriorPattern)?;
        let replacement = ctx
            .last_replacement()
            .ok_or(EdError::NoPriorReplacement)?
            .to_string();
        let options = SubstituteOptions::parse(ctx.last_options().unwrap_or(DEFAULT_OPTIONS))?;
        Ok(Self {
            pattern,
            replacement,
            options,
        })
    }

    /// Rebuild `line` with the selected matches replaced.
    ///
    /// Returns `None` when the pattern does not match at all. A line with
    /// matches is always rebuilt, even if no match was selected.
    pub fn apply(&self, line: &str) -> Option<String> {
        let mut matches = self.pattern.find_iter(line).peekable();
        matches.peek()?;

        let mut result = String::with_capacity(line.len() + self.replacement.len());
        let mut last_end = 0;
        for (i, m) in matches.enumerate() {
            result.push_str(&line[last_end..m.start()]);
            if self.options.selects(i) {
                result.push_str(&self.replacement);
            } else {
                result.push_str(m.as_str());
            }
            last_end = m.end();
        }
        result.push_str(&line[last_end..]);
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &str) -> Substitution {
        let mut ctx = EditContext::default();
        Substitution::parse(args, &mut ctx).unwrap()
    }

    #[test]
    fn test_single_match_default_options() {
        let s = parse("/cat/dog/");
        assert_eq!(s.apply("the cat sat"), Some("the dog sat".to_string()));
        assert!(s.options.print);
        assert!(!s.options.global);
    }

    #[test]
    fn test_global_replaces_all() {
        let s = parse("/a/X/g");
        assert_eq!(s.apply("a-a-a"), Some("X-X-X".to_string()));
        assert!(!s.options.print);
    }

    #[test]
    fn test_no_match_returns_none() {
        let s = parse("/zzz/y/g");
        assert_eq!(s.apply("abc"), None);
    }

    #[test]
    fn test_numbered_occurrences() {
        assert_eq!(parse("/o/0/2").apply("foo boo"), Some("fo0 boo".to_string()));
        assert_eq!(parse("/o/0/13").apply("foo boo"), Some("f0o b0o".to_string()));
    }

    #[test]
    fn test_global_wins_over_digits() {
        let s = parse("/o/0/2g");
        assert_eq!(s.apply("foo boo"), Some("f00 b00".to_string()));
    }

    #[test]
    fn test_only_unselected_matches_leave_line_as_is() {
        let s = parse("/o/0/9");
        assert_eq!(s.apply("foo"), Some("foo".to_string()));
    }

    #[test]
    fn test_unterminated_pattern_means_empty_replacement() {
        let s = parse("/cat");
        assert_eq!(s.replacement, "");
        assert_eq!(s.apply("a cat"), Some("a ".to_string()));
        assert!(s.options.print);
    }

    #[test]
    fn test_unterminated_replacement_uses_defaults() {
        let s = parse("/cat/dog");
        assert_eq!(s.replacement, "dog");
        assert!(s.options.print);
        assert!(s.options.selects(0));
        assert!(!s.options.selects(1));
    }

    #[test]
    fn test_other_delimiter_and_escapes() {
        let s = parse(r"#a/b#c\#d#g");
        assert_eq!(s.apply("a/b"), Some("c#d".to_string()));

        let s = parse(r"/a\/b/x/");
        assert_eq!(s.apply("a/b"), Some("x".to_string()));
    }

    #[test]
    fn test_replacement_is_literal() {
        let s = parse("/(o)/$1/g");
        assert_eq!(s.apply("foo"), Some("f$1$1".to_string()));
    }

    #[test]
    fn test_empty_pattern_reuses_last() {
        let mut ctx = EditContext::default();
        ctx.pattern_or_last("b+").unwrap();
        let s = Substitution::parse("//-/g", &mut ctx).unwrap();
        assert_eq!(s.apply("abbcb"), Some("a-c-".to_string()));
    }

    #[test]
    fn test_empty_pattern_without_prior() {
        let mut ctx = EditContext::default();
        assert!(matches!(
            Substitution::parse("//x/", &mut ctx),
            Err(EdError::NoPriorPattern)
        ));
    }

    #[test]
    fn test_percent_reuses_last_replacement() {
        let mut ctx = EditContext::default();
        Substitution::parse("/a/ZZ/", &mut ctx).unwrap();
        let s = Substitution::parse("/b/%/g", &mut ctx).unwrap();
        assert_eq!(s.replacement, "ZZ");

        let mut fresh = EditContext::default();
        assert!(matches!(
            Substitution::parse("/b/%/", &mut fresh),
            Err(EdError::NoPriorReplacement)
        ));
        assert!(fresh.last_search().is_none());
    }

    #[test]
    fn test_bare_s_repeats_last_substitution() {
        let mut ctx = EditContext::default();
        assert!(matches!(
            Substitution::parse("", &mut ctx),
            Err(EdError::NoPriorPattern)
        ));
        Substitution::parse("/x/y/g", &mut ctx).unwrap();
        let s = Substitution::parse("", &mut ctx).unwrap();
        assert_eq!(s.pattern.as_str(), "x");
        assert_eq!(s.replacement, "y");
        assert!(s.options.global);
    }

    #[test]
    fn test_search_without_replacement_blocks_bare_s() {
        let mut ctx = EditContext::default();
        ctx.pattern_or_last("x").unwrap();
        assert!(matches!(
            Substitution::parse("", &mut ctx),
            Err(EdError::NoPriorReplacement)
        ));
    }

    #[test]
    fn test_bad_pattern_and_option() {
        let mut ctx = EditContext::default();
        assert!(matches!(
            Substitution::parse("/(/x/", &mut ctx),
            Err(EdError::BadRegex(_))
        ));
        assert!(matches!(
            Substitution::parse("/a/x/q", &mut ctx),
            Err(EdError::UnrecognizedCommand(_))
        ));
        assert!(ctx.last_search().is_none());
    }

    #[test]
    fn test_empty_matches_are_non_overlapping() {
        let s = parse("/x*/-/g");
        assert_eq!(s.apply("ab"), Some("-a-b-".to_string()));
    }
}

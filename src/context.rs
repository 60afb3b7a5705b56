//! Per-session parse context
//!
//! Holds the buffer together with the "last" slots the command language
//! remembers between commands: the last compiled search pattern, the last
//! substitution replacement and the last substitution options.

use crate::buffer::Buffer;
use crate::error::{EdError, EdResult};
use regex::{Regex, RegexBuilder};

/// Regex compile settings applied to every pattern in a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternOptions {
    pub case_insensitive: bool,
}

#[derive(Debug, Default)]
pub struct EditContext {
    pub buffer: Buffer,
    pattern_options: PatternOptions,
    last_search: Option<Regex>,
    last_replacement: Option<String>,
    last_options: Option<String>,
}

impl EditContext {
    pub fn new(buffer: Buffer, pattern_options: PatternOptions) -> Self {
        Self {
            buffer,
            pattern_options,
            ..Self::default()
        }
    }

    pub fn with_buffer(buffer: Buffer) -> Self {
        Self::new(buffer, PatternOptions::default())
    }

    pub fn compile(&self, pattern: &str) -> EdResult<Regex> {
        RegexBuilder::new(pattern)
            .case_insensitive(self.pattern_options.case_insensitive)
            .build()
            .map_err(|e| {
                tracing::debug!(pattern, error = %e, "pattern failed to compile");
                EdError::BadRegex(error_summary(&e.to_string()))
            })
    }

    /// Compile `body`, or fall back to the last pattern when it is empty.
    /// Does not touch the last-pattern slot.
    pub fn resolve_pattern(&self, body: &str) -> EdResult<Regex> {
        if body.is_empty() {
            return self.last_search.clone().ok_or(EdError::NoPriorPattern);
        }
        self.compile(body)
    }

    /// Like [`resolve_pattern`](Self::resolve_pattern), remembering the result
    pub fn pattern_or_last(&mut self, body: &str) -> EdResult<Regex> {
        let re = self.resolve_pattern(body)?;
        self.remember_search(re.clone());
        Ok(re)
    }

    pub fn remember_search(&mut self, re: Regex) {
        self.last_search = Some(re);
    }

    /// Swap the last search pattern, handing back the old one
    pub fn replace_search(&mut self, re: Option<Regex>) -> Option<Regex> {
        std::mem::replace(&mut self.last_search, re)
    }

    pub fn last_search(&self) -> Option<&Regex> {
        self.last_search.as_ref()
    }

    pub fn last_replacement(&self) -> Option<&str> {
        self.last_replacement.as_deref()
    }

    pub fn last_options(&self) -> Option<&str> {
        self.last_options.as_deref()
    }

    pub fn remember_substitution(&mut self, replacement: &str, options: &str) {
        self.last_replacement = Some(replacement.to_string());
        self.last_options = Some(options.to_string());
    }
}

// regex errors span several lines, the last one names the problem
fn error_summary(msg: &str) -> String {
    msg.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .unwrap_or("invalid pattern")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern_without_prior_fails() {
        let mut ctx = EditContext::default();
        assert!(matches!(ctx.pattern_or_last(""), Err(EdError::NoPriorPattern)));
    }

    #[test]
    fn test_pattern_becomes_last() {
        let mut ctx = EditContext::default();
        ctx.pattern_or_last("fo+").unwrap();
        let reused = ctx.pattern_or_last("").unwrap();
        assert_eq!(reused.as_str(), "fo+");
    }

    #[test]
    fn test_bad_pattern_keeps_previous() {
        let mut ctx = EditContext::default();
        ctx.pattern_or_last("abc").unwrap();
        assert!(matches!(ctx.pattern_or_last("(abc"), Err(EdError::BadRegex(_))));
        assert_eq!(ctx.last_search().unwrap().as_str(), "abc");
    }

    #[test]
    fn test_bad_regex_message_is_single_line() {
        let ctx = EditContext::default();
        match ctx.compile("[a-") {
            Err(EdError::BadRegex(msg)) => assert!(!msg.contains('\n')),
            other => panic!("expected BadRegex, got {:?}", other),
        }
    }

    #[test]
    fn test_case_insensitive_option() {
        let ctx = EditContext::new(
            Buffer::new(),
            PatternOptions {
                case_insensitive: true,
            },
        );
        let re = ctx.compile("hello").unwrap();
        assert!(re.is_match("HeLLo world"));
    }
}

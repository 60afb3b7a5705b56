//! In-memory line buffer
//!
//! Lines are addressed by 0-based index. The buffer tracks the current line
//! (`dot`), whether it has unsaved changes and the file it belongs to.

use regex::Regex;
use std::path::{Path, PathBuf};

/// Inclusive range of 0-based line indices, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "range start {} after end {}", start, end);
        Self { start, end }
    }

    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && line <= self.end
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

#[derive(Debug, Clone, Default)]
pub struct Buffer {
    lines: Vec<String>,
    dot: usize,
    dirty: bool,
    filename: Option<PathBuf>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a clean buffer from existing lines, with dot on the last line
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut buf = Self::new();
        buf.replace_all(lines.into_iter().map(Into::into).collect());
        buf
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the last line, -1 when the buffer is empty
    pub fn last_index(&self) -> isize {
        self.lines.len() as isize - 1
    }

    pub fn dot(&self) -> usize {
        self.dot
    }

    /// Move the current line, clamped into the buffer
    pub fn set_dot(&mut self, line: usize) {
        self.dot = line.min(self.lines.len().saturating_sub(1));
    }

    pub fn line(&self, i: usize) -> &str {
        &self.lines[i]
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn set_line(&mut self, i: usize, text: String) {
        if self.lines[i] != text {
            self.lines[i] = text;
            self.dirty = true;
        }
    }

    /// Insert `new_lines` so the first of them ends up at index `at`
    pub fn insert_lines(&mut self, at: usize, new_lines: Vec<String>) {
        if new_lines.is_empty() {
            return;
        }
        let at = at.min(self.lines.len());
        self.lines.splice(at..at, new_lines);
        self.dirty = true;
    }

    /// Remove the lines in `range` and hand them back
    pub fn delete_lines(&mut self, range: Range) -> Vec<String> {
        let removed: Vec<String> = self.lines.drain(range.start..=range.end).collect();
        self.dirty = true;
        self.set_dot(self.dot);
        removed
    }

    /// First line after `from` matching `re`, without wrapping
    pub fn search_forward(&self, re: &Regex, from: usize) -> Option<usize> {
        self.lines
            .iter()
            .enumerate()
            .skip(from + 1)
            .find(|(_, line)| re.is_match(line))
            .map(|(i, _)| i)
    }

    /// Last line before `from` matching `re`, without wrapping
    pub fn search_backward(&self, re: &Regex, from: usize) -> Option<usize> {
        let end = from.min(self.lines.len());
        self.lines[..end]
            .iter()
            .rposition(|line| re.is_match(line))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, path: impl Into<PathBuf>) {
        self.filename = Some(path.into());
    }

    /// Swap in a whole new set of lines, as after reading a file
    pub fn replace_all(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.dot = self.lines.len().saturating_sub(1);
        self.dirty = false;
    }
}

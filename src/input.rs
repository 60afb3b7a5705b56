//! Sources of input lines
//!
//! Commands and the text typed after `a`, `i` and `c` come from the same
//! source, one line at a time.

use std::collections::VecDeque;
use std::io::BufRead;

pub trait LineSource {
    /// Next line without its line ending, `None` at end of input
    fn next_line(&mut self) -> Option<String>;
}

/// Line source over any buffered reader, usually locked stdin
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
            Err(e) => {
                tracing::warn!(error = %e, "input failed, treating as end of input");
                None
            }
        }
    }
}

/// Scripted input, handy for driving a session from code
impl LineSource for VecDeque<String> {
    fn next_line(&mut self) -> Option<String> {
        self.pop_front()
    }
}

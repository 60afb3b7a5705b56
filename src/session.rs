//! The read/dispatch loop
//!
//! A session reads command lines from its input, runs each one against the
//! buffer and writes any failure to the diagnostic channel. Errors never end
//! the session; only a quit command or the end of input does.

use crate::buffer::{Buffer, Range};
use crate::command::{parse_command, Command};
use crate::context::EditContext;
use crate::error::{EdError, EdResult};
use crate::executor::{execute, Outcome};
use crate::input::LineSource;
use crate::operation::Operation;
use std::io::Write;
use std::path::Path;

pub struct Session<I, O, E> {
    ctx: EditContext,
    input: I,
    out: O,
    diagnostics: E,
    prompt: Option<String>,
    last_error: Option<EdError>,
}

impl<I, O, E> Session<I, O, E>
where
    I: LineSource,
    O: Write,
    E: Write,
{
    pub fn new(ctx: EditContext, input: I, out: O, diagnostics: E) -> Self {
        Self {
            ctx,
            input,
            out,
            diagnostics,
            prompt: None,
            last_error: None,
        }
    }

    /// Print `prompt` before reading each command
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn context(&self) -> &EditContext {
        &self.ctx
    }

    pub fn buffer(&self) -> &Buffer {
        &self.ctx.buffer
    }

    pub fn output(&self) -> &O {
        &self.out
    }

    pub fn diagnostics(&self) -> &E {
        &self.diagnostics
    }

    /// The most recent error reported, if any
    pub fn last_error(&self) -> Option<&EdError> {
        self.last_error.as_ref()
    }

    /// Load the file named on the command line.
    ///
    /// Behaves like `r`, except that a file that can't be read still becomes
    /// the default filename.
    pub fn open(&mut self, path: &Path) -> EdResult<()> {
        tracing::info!(path = %path.display(), "opening file");
        let cmd = Command {
            range: Range::single(0),
            op: Operation::Read {
                path: path.to_path_buf(),
            },
        };
        if let Err(e) = execute(&cmd, &mut self.ctx, &mut self.input, &mut self.out) {
            if self.ctx.buffer.filename().is_none() {
                self.ctx.buffer.set_filename(path);
            }
            self.report(e)?;
        }
        Ok(())
    }

    /// Parse and run a single command line
    pub fn run_line(&mut self, line: &str) -> EdResult<Outcome> {
        tracing::debug!(command = line, "read command");

        let cmd = match parse_command(line, &mut self.ctx) {
            Ok(cmd) => cmd,
            Err(e) => {
                self.report(e)?;
                Command::nop()
            }
        };

        match execute(&cmd, &mut self.ctx, &mut self.input, &mut self.out) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.report(e)?;
                Ok(Outcome::Continue)
            }
        }
    }

    /// Run commands until quit or end of input.
    ///
    /// Only a failure to write to the output or diagnostic channel is
    /// returned; command errors are reported and skipped.
    pub fn run(&mut self) -> EdResult<()> {
        loop {
            if let Some(prompt) = &self.prompt {
                write!(self.out, "{}", prompt).map_err(|e| EdError::io("<stdout>", e))?;
            }
            self.out.flush().map_err(|e| EdError::io("<stdout>", e))?;

            let Some(line) = self.input.next_line() else {
                tracing::debug!("end of input");
                break;
            };
            if self.run_line(&line)? == Outcome::Quit {
                tracing::debug!("quit");
                break;
            }
        }
        self.out.flush().map_err(|e| EdError::io("<stdout>", e))?;
        Ok(())
    }

    fn report(&mut self, err: EdError) -> EdResult<()> {
        tracing::warn!(error = %err, "command failed");
        writeln!(self.diagnostics, "{}", err.diagnostic())
            .map_err(|e| EdError::io("<stderr>", e))?;
        self.last_error = Some(err);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    type TestSession = Session<VecDeque<String>, Vec<u8>, Vec<u8>>;

    fn session(lines: &[&str], script: &[&str]) -> TestSession {
        let ctx = EditContext::with_buffer(Buffer::from_lines(lines.iter().copied()));
        let input = script.iter().map(|s| s.to_string()).collect();
        Session::new(ctx, input, Vec::new(), Vec::new())
    }

    fn stdout(s: &TestSession) -> String {
        String::from_utf8(s.output().clone()).unwrap()
    }

    fn stderr(s: &TestSession) -> String {
        String::from_utf8(s.diagnostics().clone()).unwrap()
    }

    fn lines(s: &TestSession) -> Vec<&str> {
        s.buffer().lines().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_dirty_quit_is_refused_then_forced() {
        let mut s = session(&["a"], &["s/a/b/", "q", "p", "Q", "p"]);
        s.run().unwrap();
        assert_eq!(stdout(&s), "b\nb\n");
        assert_eq!(stderr(&s), "?  dirty buffer\n");
        assert_eq!(lines(&s), vec!["b"]);
        assert!(s.buffer().is_dirty());
    }

    #[test]
    fn test_clean_quit_stops_reading() {
        let mut s = session(&["a"], &["q", "p"]);
        s.run().unwrap();
        assert_eq!(stdout(&s), "");
        assert_eq!(stderr(&s), "");
    }

    #[test]
    fn test_append_text_is_not_run_as_commands() {
        let mut s = session(&[], &["a", "d", "q", ".", ",p"]);
        s.run().unwrap();
        assert_eq!(lines(&s), vec!["d", "q"]);
        assert_eq!(stdout(&s), "d\nq\n");
        assert_eq!(stderr(&s), "");
    }

    #[test]
    fn test_errors_do_not_end_the_session() {
        let mut s = session(&["one", "two"], &["5p", "x", "/zzz/", "s/nope/x/", "2p"]);
        s.run().unwrap();
        assert_eq!(
            stderr(&s),
            "?  bad range\n?  x: unrecognised command\n?  no match\n?  no match\n"
        );
        assert_eq!(stdout(&s), "two\n");
        assert!(matches!(s.last_error(), Some(EdError::NoMatch)));
        assert_eq!(lines(&s), vec!["one", "two"]);
    }

    #[test]
    fn test_huge_relative_address_is_reported() {
        let mut s = session(
            &["a", "b", "c"],
            &["2", "+9223372036854775807p", "1m+9223372036854775807", "1p"],
        );
        s.run().unwrap();
        assert_eq!(stderr(&s), "?  bad range\n?  bad range\n");
        assert_eq!(stdout(&s), "b\na\n");
        assert_eq!(lines(&s), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_search_then_substitute_with_last_pattern() {
        let mut s = session(&["alpha", "beta", "gamma"], &["1", "/amm/", "s//AMM/", "Q"]);
        s.run().unwrap();
        assert_eq!(stdout(&s), "alpha\ngamma\ngAMMa\n");
        assert_eq!(lines(&s), vec!["alpha", "beta", "gAMMa"]);
    }

    #[test]
    fn test_prompt_before_each_command() {
        let mut s = session(&["a"], &["p"]).with_prompt("*");
        s.run().unwrap();
        assert_eq!(stdout(&s), "*a\n*");
    }

    #[test]
    fn test_write_and_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");

        let write_cmd = format!("w {}", path.display());
        let mut s = session(&[], &["a", "hello", "world", ".", &write_cmd, "q"]);
        s.run().unwrap();
        assert_eq!(stderr(&s), "");
        assert!(!s.buffer().is_dirty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\nworld\n");

        let mut t = session(&[], &["1d", "w", "q"]);
        t.open(&path).unwrap();
        assert_eq!(lines(&t), vec!["hello", "world"]);
        t.run().unwrap();
        assert_eq!(stderr(&t), "");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "world\n");
    }

    #[test]
    fn test_open_missing_file_keeps_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("new.txt");

        let mut s = session(&[], &["a", "fresh", ".", "w", "q"]);
        s.open(&path).unwrap();
        assert!(stderr(&s).starts_with("?  "));
        assert_eq!(s.buffer().filename(), Some(path.as_path()));

        s.run().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    }
}

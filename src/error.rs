//! Error kinds reported by the command engine
//!
//! Every failure while parsing or executing a command is one of these. The
//! session loop turns them into a single diagnostic line and keeps going.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Marker written in front of every diagnostic line
pub const DIAGNOSTIC_MARKER: &str = "?  ";

/// Errors produced while resolving addresses, parsing operations or running them
#[derive(Debug, Error)]
pub enum EdError {
    /// Address or range is malformed or outside the buffer
    #[error("bad range")]
    BadRange,

    /// A search or substitution found nothing
    #[error("no match")]
    NoMatch,

    /// Pattern failed to compile or its delimiter was never closed
    #[error("bad regex: {0}")]
    BadRegex(String),

    #[error("no previous regex")]
    NoPriorPattern,

    #[error("no previous replacement")]
    NoPriorReplacement,

    #[error("{0}")]
    UnrecognizedCommand(String),

    /// Quit or read refused because of unsaved changes
    #[error("dirty buffer")]
    DirtyBufferGuard,

    #[error("no filename")]
    MissingFilename,

    #[error("bad move target")]
    BadMoveTarget,

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EdError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        EdError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn unrecognized(command: char) -> Self {
        EdError::UnrecognizedCommand(format!("{}: unrecognised command", command))
    }

    /// Format the error as it appears on the diagnostic channel
    pub fn diagnostic(&self) -> String {
        format!("{}{}", DIAGNOSTIC_MARKER, self)
    }
}

pub type EdResult<T> = Result<T, EdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_has_marker() {
        assert_eq!(EdError::BadRange.diagnostic(), "?  bad range");
        assert_eq!(EdError::DirtyBufferGuard.diagnostic(), "?  dirty buffer");
    }

    #[test]
    fn test_unrecognized_message() {
        let err = EdError::unrecognized('z');
        assert_eq!(err.to_string(), "z: unrecognised command");
    }

    #[test]
    fn test_io_error_names_path() {
        let err = EdError::io(
            "/tmp/missing.txt",
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("/tmp/missing.txt: "));
        assert!(msg.contains("not found"));
    }
}

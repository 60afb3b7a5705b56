//! edx: a line-oriented editor in the style of ed
//!
//! The library holds the command engine: address resolution, the operation
//! parser, substitution and glob sub-languages, and the executor. The binary
//! at src/main.rs wires it to stdin, stdout and stderr.

pub mod address;
pub mod buffer;
pub mod cli;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod file_io;
pub mod input;
pub mod logger;
pub mod operation;
pub mod session;
pub mod substitute;

// Re-export commonly used types for convenience
pub use address::{parse_range, resolve_address, validate_range, AddressSlot};
pub use buffer::{Buffer, Range};
pub use command::{parse_command, Command};
pub use context::{EditContext, PatternOptions};
pub use error::{EdError, EdResult};
pub use executor::{execute, Outcome};
pub use input::{LineSource, ReaderSource};
pub use operation::{parse_operation, Glob, InputMode, Operation};
pub use session::Session;
pub use substitute::{SubstituteOptions, Substitution};

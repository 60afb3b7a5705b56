//! Command entry point
//!
//! A command line is an address prefix followed by an operation. This module
//! ties the range parser and the operation parser together and checks the
//! range against the buffer before anything is executed.

use crate::address::{parse_range, validate_range};
use crate::buffer::Range;
use crate::context::EditContext;
use crate::error::{EdError, EdResult};
use crate::operation::{parse_operation, Operation};

/// A fully parsed command, ready for the executor
#[derive(Debug, Clone)]
pub struct Command {
    pub range: Range,
    pub op: Operation,
}

impl Command {
    /// Stand-in for a command that failed to parse
    pub fn nop() -> Self {
        Self {
            range: Range::single(0),
            op: Operation::Nop,
        }
    }
}

/// Parse a whole command line.
///
/// `g` and `v` without an address cover the whole buffer instead of the
/// current line.
pub fn parse_command(line: &str, ctx: &mut EditContext) -> EdResult<Command> {
    let parsed = parse_range(line, ctx)?;
    let whole_buffer = !parsed.explicit && parsed.rest.starts_with(['g', 'v']);

    let range = if whole_buffer {
        if ctx.buffer.is_empty() {
            return Err(EdError::BadRange);
        }
        Range::new(0, ctx.buffer.num_lines() - 1)
    } else {
        validate_range(parsed.first, parsed.last, &ctx.buffer)?
    };

    let (op, rest) = parse_operation(parsed.rest, ctx)?;
    if !rest.is_empty() {
        tracing::debug!(ignored = rest, "trailing command text ignored");
    }
    Ok(Command { range, op })
}

//! Running parsed commands against the buffer
//!
//! Per-line operations walk the range in increasing order. Lines marked for
//! deletion are only removed once the walk is over, highest index first, so
//! indices seen during the walk stay valid.

use crate::buffer::Range;
use crate::command::Command;
use crate::context::EditContext;
use crate::error::{EdError, EdResult};
use crate::file_io;
use crate::input::LineSource;
use crate::operation::{InputMode, Operation};
use std::io::Write;
use std::path::Path;

/// What the session loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// Effect of a per-line operation on one line
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineEffect {
    /// Not selected (glob miss, substitution miss); dot does not move here
    Untouched,
    Kept,
    Replaced(String),
    Deleted,
}

pub fn execute(
    cmd: &Command,
    ctx: &mut EditContext,
    input: &mut dyn LineSource,
    out: &mut dyn Write,
) -> EdResult<Outcome> {
    tracing::debug!(
        operation = cmd.op.name(),
        start = cmd.range.start,
        end = cmd.range.end,
        "executing"
    );

    match &cmd.op {
        Operation::Print
        | Operation::PrintNumbered
        | Operation::Delete
        | Operation::Substitute(_)
        | Operation::Global(_) => apply_per_line(&cmd.op, cmd.range, ctx, out)?,
        Operation::Input(mode) => insert_input(*mode, cmd.range, ctx, input)?,
        Operation::Move { destination } => move_lines(cmd.range, *destination, ctx)?,
        Operation::Read { path } => read_file(path, ctx)?,
        Operation::Write { path } => write_file(path, ctx)?,
        Operation::Quit => return Ok(Outcome::Quit),
        Operation::Nop => {}
    }
    Ok(Outcome::Continue)
}

fn apply_per_line(
    op: &Operation,
    range: Range,
    ctx: &mut EditContext,
    out: &mut dyn Write,
) -> EdResult<()> {
    if ctx.buffer.is_empty() {
        return Err(EdError::BadRange);
    }

    let mut deleted = Vec::new();
    let mut last_visited = None;
    let mut replaced = 0usize;

    for i in range.iter() {
        let line = ctx.buffer.line(i).to_string();
        match line_effect(op, i, &line, out)? {
            LineEffect::Untouched => continue,
            LineEffect::Kept => {}
            LineEffect::Replaced(text) => {
                replaced += 1;
                ctx.buffer.set_line(i, text);
            }
            LineEffect::Deleted => deleted.push(i),
        }
        last_visited = Some(i);
    }

    if matches!(op, Operation::Substitute(_)) && replaced == 0 {
        return Err(EdError::NoMatch);
    }

    for &i in deleted.iter().rev() {
        ctx.buffer.delete_lines(Range::single(i));
    }

    if let Some(i) = last_visited {
        // account for deleted lines that sat above the last visited one
        let shift = deleted.iter().filter(|&&d| d < i).count();
        ctx.buffer.set_dot(i - shift);
    }
    Ok(())
}

fn line_effect(
    op: &Operation,
    index: usize,
    line: &str,
    out: &mut dyn Write,
) -> EdResult<LineEffect> {
    let effect = match op {
        Operation::Print => {
            writeln!(out, "{}", line).map_err(stdout_error)?;
            LineEffect::Kept
        }
        Operation::PrintNumbered => {
            writeln!(out, "{}\t{}", index + 1, line).map_err(stdout_error)?;
            LineEffect::Kept
        }
        Operation::Delete => LineEffect::Deleted,
        Operation::Substitute(subst) => match subst.apply(line) {
            Some(result) => {
                if subst.options.print {
                    writeln!(out, "{}", result).map_err(stdout_error)?;
                }
                LineEffect::Replaced(result)
            }
            None => LineEffect::Untouched,
        },
        Operation::Global(glob) => {
            if glob.selects(line) {
                line_effect(&glob.command, index, line, out)?
            } else {
                LineEffect::Untouched
            }
        }
        // execute only routes per-line operations here, and parse_global
        // rejects anything else as a nested command
        Operation::Move { .. }
        | Operation::Input(_)
        | Operation::Read { .. }
        | Operation::Write { .. }
        | Operation::Quit
        | Operation::Nop => unreachable!("{} is not a per-line operation", op.name()),
    };
    Ok(effect)
}

fn stdout_error(e: std::io::Error) -> EdError {
    EdError::io("<stdout>", e)
}

/// Read text lines until a lone `.` or end of input
fn read_text(input: &mut dyn LineSource) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(line) = input.next_line() {
        if line == "." {
            break;
        }
        lines.push(line);
    }
    lines
}

fn insert_input(
    mode: InputMode,
    range: Range,
    ctx: &mut EditContext,
    input: &mut dyn LineSource,
) -> EdResult<()> {
    if mode == InputMode::Change && ctx.buffer.is_empty() {
        return Err(EdError::BadRange);
    }

    let lines = read_text(input);
    let count = lines.len();

    let at = match mode {
        InputMode::Change => {
            ctx.buffer.delete_lines(range);
            range.start
        }
        InputMode::Insert => range.start,
        InputMode::Append if ctx.buffer.is_empty() => 0,
        InputMode::Append => range.end + 1,
    };

    ctx.buffer.insert_lines(at, lines);
    if count > 0 {
        ctx.buffer.set_dot(at + count - 1);
    } else if mode == InputMode::Change {
        ctx.buffer.set_dot(at);
    }
    tracing::debug!(?mode, at, count, "inserted text");
    Ok(())
}

fn move_lines(range: Range, destination: isize, ctx: &mut EditContext) -> EdResult<()> {
    if ctx.buffer.is_empty() {
        return Err(EdError::BadRange);
    }
    let inside = destination >= range.start as isize && destination <= range.end as isize;
    if destination < -1 || destination > ctx.buffer.last_index() || inside {
        return Err(EdError::BadMoveTarget);
    }

    let moved = ctx.buffer.delete_lines(range);
    let count = moved.len();
    let destination = if destination > range.end as isize {
        destination - count as isize
    } else {
        destination
    };

    // lines go after the destination line
    let at = (destination + 1) as usize;
    ctx.buffer.insert_lines(at, moved);
    ctx.buffer.set_dot(at + count - 1);
    Ok(())
}

fn read_file(path: &Path, ctx: &mut EditContext) -> EdResult<()> {
    let contents = file_io::read_lines(path)?;
    tracing::info!(
        path = %path.display(),
        lines = contents.lines.len(),
        bytes = contents.bytes,
        "read file"
    );
    ctx.buffer.replace_all(contents.lines);
    ctx.buffer.set_filename(path);
    Ok(())
}

fn write_file(path: &Path, ctx: &mut EditContext) -> EdResult<()> {
    let bytes = file_io::write_lines(path, ctx.buffer.lines())?;
    tracing::info!(
        path = %path.display(),
        lines = ctx.buffer.num_lines(),
        bytes,
        "wrote file"
    );
    ctx.buffer.set_filename(path);
    ctx.buffer.mark_clean();
    Ok(())
}

//! Reading files into a buffer and writing them back
//!
//! Writes go to a temp file next to the target and are renamed into place,
//! so a failed write never leaves a half-written file behind.

use crate::error::{EdError, EdResult};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Lines read from a file, and the number of bytes they took on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    pub lines: Vec<String>,
    pub bytes: usize,
}

pub fn read_lines(path: &Path) -> EdResult<FileContents> {
    let file = File::open(path).map_err(|e| EdError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut lines = Vec::new();
    let mut bytes = 0;
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader
            .read_line(&mut line)
            .map_err(|e| EdError::io(path, e))?;
        if n == 0 {
            break;
        }
        bytes += n;
        let text = line.strip_suffix('\n').unwrap_or(&line);
        let text = text.strip_suffix('\r').unwrap_or(text);
        lines.push(text.to_string());
    }

    Ok(FileContents { lines, bytes })
}

/// Write every line followed by a newline; returns the byte count.
///
/// An existing target keeps its permissions, and a symlink is written
/// through rather than replaced.
pub fn write_lines(path: &Path, lines: &[String]) -> EdResult<usize> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let temp_file = NamedTempFile::new_in(parent).map_err(|e| EdError::io(parent, e))?;
    let mut bytes = 0;

    // writer must be dropped before persist
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        for line in lines {
            writeln!(writer, "{}", line).map_err(|e| EdError::io(path, e))?;
            bytes += line.len() + 1;
        }
        writer.flush().map_err(|e| EdError::io(path, e))?;
    }

    if let Ok(metadata) = fs::metadata(&target) {
        temp_file
            .as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| EdError::io(path, e))?;
    }

    temp_file
        .persist(&target)
        .map_err(|e| EdError::io(path, e.error))?;
    Ok(bytes)
}

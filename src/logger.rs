//! Debug logging support for edx
//!
//! When debug mode is enabled via config, flag or the EDX_LOG variable,
//! operations are logged to ~/.edx/edx.log. Nothing is ever logged to the
//! terminal, since stdout and stderr carry the editor's own output.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Environment variable holding a custom log filter
pub const LOG_ENV: &str = "EDX_LOG";

/// Initialize the debug logging system
///
/// Returns the path to the log file, or None if logging is not enabled.
pub fn init_debug_logging(debug_enabled: bool) -> Result<Option<PathBuf>> {
    let env_filter = std::env::var(LOG_ENV).ok().filter(|f| !f.is_empty());
    if !debug_enabled && env_filter.is_none() {
        return Ok(None);
    }

    let log_path = get_log_path()?;

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()));

    match file {
        Ok(log_file) => {
            let subscriber = registry()
                .with(
                    fmt::layer()
                        .with_writer(log_file)
                        .with_ansi(false)
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false),
                )
                .with(EnvFilter::new(filter_directive(
                    env_filter.as_deref(),
                    debug_enabled,
                )));

            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

            Ok(Some(log_path))
        }
        Err(e) => {
            // editing still works without a log
            eprintln!("Warning: Could not create log file: {:#}", e);
            Ok(None)
        }
    }
}

fn filter_directive(env_filter: Option<&str>, debug_enabled: bool) -> String {
    match env_filter {
        Some(filter) => filter.to_string(),
        None if debug_enabled => "edx=debug".to_string(),
        None => "edx=info".to_string(),
    }
}

/// Get the log file path without initializing logging
pub fn get_log_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home_dir.join(".edx").join("edx.log"))
}

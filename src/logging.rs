//! Tracing subscriber setup.
//!
//! `RUST_LOG` controls verbosity (default: `warn`). The CLI logs to stderr.
//! The TUI owns the terminal, so it logs to the file named by `COVID_DASH_LOG`
//! or not at all.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

pub const LOG_FILE_ENV: &str = "COVID_DASH_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,reqwest=warn,hyper=warn,hyper_util=warn,rustls=warn"))
}

/// Log to stderr (CLI subcommands).
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log to `$COVID_DASH_LOG` if set; otherwise install nothing.
pub fn init_for_tui() -> Result<(), AppError> {
    let Some(path) = std::env::var_os(LOG_FILE_ENV) else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| {
            AppError::new(
                2,
                format!("Failed to open log file '{}': {e}", path.to_string_lossy()),
            )
        })?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

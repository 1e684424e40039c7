//! Log sink setup.
//!
//! The runtime's stdout and stderr belong to the runtime, so every record
//! goes to an append-only file instead.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use systemd_hook_common::config::{HookConfig, LogFormat};
use tracing_subscriber::EnvFilter;

/// Opens `path` for appending, creating it if needed.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn open_sink(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Installs the global subscriber writing to the configured log file.
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or the level is not a
/// valid filter directive.
pub fn init(config: &HookConfig) -> anyhow::Result<()> {
    let sink = open_sink(&config.log_file)?;
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("invalid log level {:?}", config.log_level))?,
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(sink));
    match config.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

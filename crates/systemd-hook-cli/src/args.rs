//! Command-line arguments and their merge into [`HookConfig`].

use std::path::PathBuf;

use clap::Parser;
use systemd_hook_common::config::{HookConfig, LogFormat};
use systemd_hook_common::error::Result;

/// OCI prestart hook that prepares a container rootfs for systemd.
///
/// Reads the container state from stdin; all output goes to the log file.
#[derive(Parser, Debug)]
#[command(name = "oci-systemd-hook", version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file; flags below override its values.
    #[arg(long, env = "SYSTEMD_HOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Append-only log file.
    #[arg(long, env = "SYSTEMD_HOOK_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "SYSTEMD_HOOK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log record format (`text` or `json`).
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Stage name some runtimes append, e.g. `prestart`. Logged only.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub stage: Vec<String>,
}

impl Cli {
    /// Builds the effective configuration: defaults, then the config file,
    /// then command-line flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the result
    /// is invalid.
    pub fn resolve_config(&self) -> Result<HookConfig> {
        let mut config = match &self.config {
            Some(path) => HookConfig::load(path)?,
            None => HookConfig::default(),
        };
        if let Some(log_file) = &self.log_file {
            config.log_file.clone_from(log_file);
        }
        if let Some(log_level) = &self.log_level {
            config.log_level.clone_from(log_level);
        }
        if let Some(log_format) = self.log_format {
            config.log_format = log_format;
        }
        config.validate()?;
        Ok(config)
    }
}

//! Configuration model for the hook.
//!
//! Everything has a built-in default matching the layout systemd expects;
//! a JSON file can override any field, and the CLI overrides the file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{HookError, Result};

/// Root configuration for one hook invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Append-only log sink.
    pub log_file: PathBuf,
    /// Tracing filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Output format of the log sink.
    pub log_format: LogFormat,
    /// Container-relative paths the hook prepares.
    pub layout: RootfsLayout,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(constants::DEFAULT_LOG_FILE),
            log_level: constants::DEFAULT_LOG_LEVEL.to_owned(),
            log_format: LogFormat::Text,
            layout: RootfsLayout::default(),
        }
    }
}

impl HookConfig {
    /// Reads a JSON configuration file and validates it.
    ///
    /// Fields missing from the file keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails [`HookConfig::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path).map_err(|e| HookError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_slice(&raw).map_err(|e| HookError::Decode {
            what: path.display().to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every layout entry is a non-empty relative path.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Config`] naming the first offending entry.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()
    }
}

/// Paths inside the container rootfs, all relative to the rootfs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootfsLayout {
    /// Mount point of the systemd cgroup hierarchy.
    pub cgroup_systemd: PathBuf,
    /// Directories to mount tmpfs on, in order.
    pub tmpfs_dirs: Vec<PathBuf>,
    /// Location of the machine identity file.
    pub machine_id: PathBuf,
}

impl Default for RootfsLayout {
    fn default() -> Self {
        Self {
            cgroup_systemd: PathBuf::from(constants::CGROUP_SYSTEMD_PATH),
            tmpfs_dirs: constants::TMPFS_DIRS.iter().map(PathBuf::from).collect(),
            machine_id: PathBuf::from(constants::MACHINE_ID_PATH),
        }
    }
}

impl RootfsLayout {
    fn validate(&self) -> Result<()> {
        let entries = std::iter::once(("cgroup_systemd", &self.cgroup_systemd))
            .chain(self.tmpfs_dirs.iter().map(|p| ("tmpfs_dirs", p)))
            .chain(std::iter::once(("machine_id", &self.machine_id)));
        for (field, path) in entries {
            if path.as_os_str().is_empty() || path.is_absolute() {
                return Err(HookError::Config {
                    message: format!(
                        "layout.{field} must be a non-empty relative path, got {:?}",
                        path.display().to_string()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Log sink output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line records.
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}

impl FromStr for LogFormat {
    type Err = HookError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(HookError::Config {
                message: format!("unknown log format {other:?}, expected text or json"),
            }),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

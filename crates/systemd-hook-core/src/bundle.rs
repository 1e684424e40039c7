//! Bundle configuration loaded from `<bundle>/config.json`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use systemd_hook_common::constants::BUNDLE_CONFIG_FILE;
use systemd_hook_common::error::{HookError, Result};

/// The parts of the OCI runtime configuration the hook reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSpec {
    /// OCI spec version of the bundle.
    #[serde(default)]
    pub oci_version: Option<String>,
    /// Container root filesystem.
    pub root: Root,
}

/// `root` object of the OCI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Root {
    /// Rootfs path, absolute or relative to the bundle directory.
    pub path: PathBuf,
    /// Whether the runtime mounts the rootfs read-only.
    #[serde(default)]
    pub readonly: bool,
}

impl BundleSpec {
    /// Returns the rootfs as a host path.
    ///
    /// A relative `root.path` is resolved against `bundle`.
    #[must_use]
    pub fn rootfs(&self, bundle: &Path) -> PathBuf {
        if self.root.path.is_absolute() {
            self.root.path.clone()
        } else {
            bundle.join(&self.root.path)
        }
    }
}

/// Reads and decodes `config.json` from the bundle directory.
///
/// # Errors
///
/// Returns [`HookError::Io`] if the file cannot be read,
/// [`HookError::Decode`] if it is malformed or lacks `root`, and
/// [`HookError::Invalid`] if `root.path` is empty.
pub fn load_bundle_spec(bundle: &Path) -> Result<BundleSpec> {
    let path = bundle.join(BUNDLE_CONFIG_FILE);
    let raw = std::fs::read(&path).map_err(|e| HookError::Io {
        path: path.clone(),
        source: e,
    })?;
    let spec: BundleSpec = serde_json::from_slice(&raw).map_err(|e| HookError::Decode {
        what: path.display().to_string(),
        source: e,
    })?;
    if spec.root.path.as_os_str().is_empty() {
        return Err(HookError::Invalid {
            what: path.display().to_string(),
            message: "root.path is empty".to_owned(),
        });
    }
    tracing::debug!(
        config = %path.display(),
        root = %spec.root.path.display(),
        readonly = spec.root.readonly,
        "bundle spec loaded"
    );
    Ok(spec)
}

//! Hook state handed over by the runtime on standard input.
//!
//! The document follows the OCI runtime `state` schema. Only `id` and
//! `bundle` drive the hook; the remaining fields are kept for logging.

use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;

use serde::Deserialize;
use systemd_hook_common::error::{HookError, Result};
use systemd_hook_common::types::ContainerId;

/// OCI runtime state of the container being started.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationState {
    /// Container identifier.
    pub id: ContainerId,
    /// Absolute path to the container's bundle directory.
    pub bundle: PathBuf,
    /// OCI spec version the runtime implements.
    #[serde(default)]
    pub oci_version: Option<String>,
    /// Runtime status, e.g. `created`.
    #[serde(default)]
    pub status: Option<String>,
    /// PID of the container process, when one exists.
    #[serde(default)]
    pub pid: Option<i32>,
    /// Container annotations.
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

/// Reads the stream to the end and decodes it as the hook state.
///
/// # Errors
///
/// Returns [`HookError::Stream`] if the stream cannot be read and
/// [`HookError::Decode`] if it is not a valid state document.
pub fn read_state<R: Read>(mut input: R) -> Result<InvocationState> {
    let mut raw = Vec::new();
    let _ = input
        .read_to_end(&mut raw)
        .map_err(|e| HookError::Stream { source: e })?;
    let state: InvocationState = serde_json::from_slice(&raw).map_err(|e| HookError::Decode {
        what: "hook state".to_owned(),
        source: e,
    })?;
    tracing::debug!(
        id = %state.id,
        bundle = %state.bundle.display(),
        status = state.status.as_deref().unwrap_or("unknown"),
        pid = ?state.pid,
        "hook state decoded"
    );
    Ok(state)
}

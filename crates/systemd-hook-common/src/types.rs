//! Domain identifiers used across the hook.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::MACHINE_ID_LENGTH;

/// Identifier the runtime assigned to the container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    /// Creates a container ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives the machine identity from this container's ID.
    #[must_use]
    pub fn machine_id(&self) -> MachineId {
        MachineId::from_container_id(self)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contents of the container's `/etc/machine-id`.
///
/// Holds the first 32 characters of the container ID. Shorter IDs are kept
/// whole without padding, so the value is not guaranteed to be a well-formed
/// systemd machine-id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineId(String);

impl MachineId {
    /// Truncates the container ID to at most 32 characters.
    #[must_use]
    pub fn from_container_id(id: &ContainerId) -> Self {
        Self(id.as_str().chars().take(MACHINE_ID_LENGTH).collect())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the exact bytes written to disk; no trailing newline.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

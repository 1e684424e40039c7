//! Unified error type for the hook workspace.
//!
//! Every failure is fatal to the invocation; the variants only exist so the
//! logged cause says which step broke.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum HookError {
    /// The hook state could not be read from the input stream.
    #[error("failed to read hook state from stdin: {source}")]
    Stream {
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An I/O operation on a path failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A JSON document was malformed or missing required fields.
    #[error("failed to decode {what}: {source}")]
    Decode {
        /// Which document was being decoded.
        what: String,
        /// Underlying deserialization error.
        source: serde_json::Error,
    },

    /// A decoded document is well-formed but unusable.
    #[error("invalid {what}: {message}")]
    Invalid {
        /// Which document was rejected.
        what: String,
        /// Why it was rejected.
        message: String,
    },

    /// Querying a path's filesystem failed.
    #[error("filesystem query failed at {path}: {source}")]
    FilesystemQuery {
        /// Queried path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The path is expected to be a cgroup mount but is not.
    #[error("{path} is not mounted as cgroup (filesystem magic {magic:#x})")]
    NotCgroup {
        /// Path that was inspected.
        path: PathBuf,
        /// Observed filesystem magic number.
        magic: i64,
    },

    /// A `mount(2)` call failed.
    #[error("mount at {target} failed: {source}")]
    Mount {
        /// Mount target.
        target: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, HookError>;

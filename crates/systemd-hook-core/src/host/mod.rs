//! Narrow capability interface over the host's filesystem and mount table.

#[cfg(target_os = "linux")]
pub mod linux;
pub mod recording;

use std::path::{Path, PathBuf};

use nix::mount::MsFlags;
use systemd_hook_common::constants::{CGROUP_SUPER_MAGIC, CGROUP2_SUPER_MAGIC};
use systemd_hook_common::error::Result;

/// Filesystem type of a mount, as reported by `statfs(2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilesystemKind {
    /// cgroup v1 hierarchy.
    CgroupV1,
    /// cgroup v2 unified hierarchy.
    CgroupV2,
    /// Anything else, with its raw magic number.
    Other(i64),
}

impl FilesystemKind {
    /// Classifies a raw filesystem magic number.
    #[must_use]
    pub const fn from_magic(magic: i64) -> Self {
        match magic {
            CGROUP_SUPER_MAGIC => Self::CgroupV1,
            CGROUP2_SUPER_MAGIC => Self::CgroupV2,
            other => Self::Other(other),
        }
    }

    /// Returns the raw magic number.
    #[must_use]
    pub const fn magic(self) -> i64 {
        match self {
            Self::CgroupV1 => CGROUP_SUPER_MAGIC,
            Self::CgroupV2 => CGROUP2_SUPER_MAGIC,
            Self::Other(magic) => magic,
        }
    }

    /// Returns `true` for either cgroup version.
    #[must_use]
    pub const fn is_cgroup(self) -> bool {
        matches!(self, Self::CgroupV1 | Self::CgroupV2)
    }
}

/// Type and current mount flags of the filesystem holding a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilesystemInfo {
    /// Filesystem type.
    pub kind: FilesystemKind,
    /// Flags the filesystem is currently mounted with.
    pub flags: MsFlags,
}

/// Arguments of a single `mount(2)` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRequest {
    /// Source device or name.
    pub source: String,
    /// Mount point.
    pub target: PathBuf,
    /// Filesystem type; `None` for remounts, where the kernel ignores it.
    pub fstype: Option<String>,
    /// Mount flags.
    pub flags: MsFlags,
    /// Filesystem-specific data string.
    pub data: Option<String>,
}

/// Host operations the hook needs, and nothing more.
///
/// [`linux::LinuxHost`] performs them against the real system;
/// [`recording::RecordingHost`] records them for tests.
pub trait HostOps {
    /// Returns the type and mount flags of the filesystem at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::FilesystemQuery`] if the path cannot be queried.
    ///
    /// [`HookError::FilesystemQuery`]: systemd_hook_common::error::HookError::FilesystemQuery
    fn filesystem_info(&self, path: &Path) -> Result<FilesystemInfo>;

    /// Returns whether `path` exists.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than the path being absent.
    fn path_exists(&self, path: &Path) -> Result<bool>;

    /// Creates a single directory with the given mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn create_dir(&self, path: &Path, mode: u32) -> Result<()>;

    /// Issues a `mount(2)` call.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Mount`] if the kernel rejects the call.
    ///
    /// [`HookError::Mount`]: systemd_hook_common::error::HookError::Mount
    fn mount(&self, request: &MountRequest) -> Result<()>;

    /// Replaces the contents of `path`, creating it with `mode` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or written.
    fn write_file(&self, path: &Path, contents: &[u8], mode: u32) -> Result<()>;
}

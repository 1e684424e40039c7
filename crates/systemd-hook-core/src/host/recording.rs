//! In-memory [`HostOps`] that records every requested operation.
//!
//! Lets the remount, tmpfs, and machine-id steps be exercised without root
//! or a container namespace. Filesystem types, pre-existing directories,
//! and failing paths are scripted up front.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use systemd_hook_common::error::{HookError, Result};

use super::{FilesystemInfo, HostOps, MountRequest};

/// One operation as seen by the host, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    /// `statfs` on a path.
    FilesystemInfo(PathBuf),
    /// `stat` on a path.
    PathExists(PathBuf),
    /// `mkdir` of a path.
    CreateDir {
        /// Created directory.
        path: PathBuf,
        /// Requested mode.
        mode: u32,
    },
    /// A `mount(2)` call.
    Mount(MountRequest),
    /// A file write.
    WriteFile {
        /// Written file.
        path: PathBuf,
        /// Full new contents.
        contents: Vec<u8>,
        /// Mode used if the file is created.
        mode: u32,
    },
}

impl HostOp {
    /// Returns `true` for operations that change the host.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateDir { .. } | Self::Mount(_) | Self::WriteFile { .. }
        )
    }
}

/// Scriptable recording host.
#[derive(Debug, Default)]
pub struct RecordingHost {
    ops: RefCell<Vec<HostOp>>,
    filesystems: HashMap<PathBuf, FilesystemInfo>,
    existing: RefCell<HashSet<PathBuf>>,
    denied: HashSet<PathBuf>,
    failing: HashSet<PathBuf>,
}

impl RecordingHost {
    /// Creates a host with no filesystems and no existing paths.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports `info` for `statfs` on `path`; the path also exists.
    #[must_use]
    pub fn with_filesystem(mut self, path: impl Into<PathBuf>, info: FilesystemInfo) -> Self {
        let path = path.into();
        let _ = self.existing.get_mut().insert(path.clone());
        let _ = self.filesystems.insert(path, info);
        self
    }

    /// Marks `path` as an existing directory.
    #[must_use]
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let _ = self.existing.get_mut().insert(path.into());
        self
    }

    /// Makes `stat` on `path` fail with permission denied.
    #[must_use]
    pub fn deny_stat(mut self, path: impl Into<PathBuf>) -> Self {
        let _ = self.denied.insert(path.into());
        self
    }

    /// Makes every mutation targeting `path` fail after being recorded.
    #[must_use]
    pub fn fail_at(mut self, path: impl Into<PathBuf>) -> Self {
        let _ = self.failing.insert(path.into());
        self
    }

    /// Returns a snapshot of every recorded operation.
    #[must_use]
    pub fn ops(&self) -> Vec<HostOp> {
        self.ops.borrow().clone()
    }

    /// Returns only the operations that changed the host.
    #[must_use]
    pub fn mutations(&self) -> Vec<HostOp> {
        self.ops
            .borrow()
            .iter()
            .filter(|op| op.is_mutation())
            .cloned()
            .collect()
    }

    /// Returns every recorded mount request.
    #[must_use]
    pub fn mounts(&self) -> Vec<MountRequest> {
        self.ops
            .borrow()
            .iter()
            .filter_map(|op| match op {
                HostOp::Mount(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, op: HostOp) {
        self.ops.borrow_mut().push(op);
    }

    fn injected(&self, path: &Path) -> Option<std::io::Error> {
        self.failing
            .contains(path)
            .then(|| std::io::Error::from(ErrorKind::PermissionDenied))
    }
}

impl HostOps for RecordingHost {
    fn filesystem_info(&self, path: &Path) -> Result<FilesystemInfo> {
        self.record(HostOp::FilesystemInfo(path.to_path_buf()));
        self.filesystems
            .get(path)
            .copied()
            .ok_or_else(|| HookError::FilesystemQuery {
                path: path.to_path_buf(),
                source: std::io::Error::from(ErrorKind::NotFound),
            })
    }

    fn path_exists(&self, path: &Path) -> Result<bool> {
        self.record(HostOp::PathExists(path.to_path_buf()));
        if self.denied.contains(path) {
            return Err(HookError::FilesystemQuery {
                path: path.to_path_buf(),
                source: std::io::Error::from(ErrorKind::PermissionDenied),
            });
        }
        Ok(self.existing.borrow().contains(path))
    }

    fn create_dir(&self, path: &Path, mode: u32) -> Result<()> {
        self.record(HostOp::CreateDir {
            path: path.to_path_buf(),
            mode,
        });
        if let Some(source) = self.injected(path) {
            return Err(HookError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
        let _ = self.existing.borrow_mut().insert(path.to_path_buf());
        Ok(())
    }

    fn mount(&self, request: &MountRequest) -> Result<()> {
        self.record(HostOp::Mount(request.clone()));
        match self.injected(&request.target) {
            Some(source) => Err(HookError::Mount {
                target: request.target.clone(),
                source,
            }),
            None => Ok(()),
        }
    }

    fn write_file(&self, path: &Path, contents: &[u8], mode: u32) -> Result<()> {
        self.record(HostOp::WriteFile {
            path: path.to_path_buf(),
            contents: contents.to_vec(),
            mode,
        });
        match self.injected(path) {
            Some(source) => Err(HookError::Io {
                path: path.to_path_buf(),
                source,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use nix::mount::MsFlags;

    use super::*;
    use crate::host::FilesystemKind;

    #[test]
    fn records_operations_in_call_order() {
        let host = RecordingHost::new();
        assert!(!host.path_exists(Path::new("/r/run")).expect("stat"));
        host.create_dir(Path::new("/r/run"), 0o755).expect("mkdir");
        assert!(host.path_exists(Path::new("/r/run")).expect("stat"));

        assert_eq!(
            host.ops(),
            vec![
                HostOp::PathExists(PathBuf::from("/r/run")),
                HostOp::CreateDir {
                    path: PathBuf::from("/r/run"),
                    mode: 0o755
                },
                HostOp::PathExists(PathBuf::from("/r/run")),
            ]
        );
        assert_eq!(host.mutations().len(), 1);
    }

    #[test]
    fn scripted_filesystem_is_reported() {
        let info = FilesystemInfo {
            kind: FilesystemKind::CgroupV2,
            flags: MsFlags::MS_RDONLY,
        };
        let host = RecordingHost::new().with_filesystem("/r/cg", info);
        assert_eq!(host.filesystem_info(Path::new("/r/cg")).expect("statfs"), info);
        assert!(host.path_exists(Path::new("/r/cg")).expect("stat"));
    }

    #[test]
    fn unknown_filesystem_is_query_error() {
        let host = RecordingHost::new();
        assert!(matches!(
            host.filesystem_info(Path::new("/nowhere")),
            Err(HookError::FilesystemQuery { .. })
        ));
    }

    #[test]
    fn failing_path_is_recorded_then_rejected() {
        let host = RecordingHost::new().fail_at("/r/etc/machine-id");
        let err = host
            .write_file(Path::new("/r/etc/machine-id"), b"id", 0o644)
            .expect_err("injected failure");
        assert!(matches!(err, HookError::Io { .. }));
        assert_eq!(host.mutations().len(), 1);
    }
}

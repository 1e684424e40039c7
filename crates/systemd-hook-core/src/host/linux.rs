//! [`HostOps`] backed by the running kernel.

use std::fs::{DirBuilder, OpenOptions};
use std::io::{ErrorKind, Write};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::Path;

use nix::mount::{MsFlags, mount};
use nix::sys::statfs::statfs;
use nix::sys::statvfs::statvfs;
use systemd_hook_common::error::{HookError, Result};

use super::{FilesystemInfo, FilesystemKind, HostOps, MountRequest};

/// Performs every operation directly on the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxHost;

impl LinuxHost {
    /// Creates the host handle.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HostOps for LinuxHost {
    #[allow(clippy::cast_possible_wrap, clippy::unnecessary_cast)]
    fn filesystem_info(&self, path: &Path) -> Result<FilesystemInfo> {
        let query_err = |e: nix::Error| HookError::FilesystemQuery {
            path: path.to_path_buf(),
            source: e.into(),
        };
        let fs = statfs(path).map_err(query_err)?;
        // statvfs(3) reports the same f_flags word; its ST_* bits share
        // values with MS_*, so they are carried over untouched.
        let vfs = statvfs(path).map_err(query_err)?;
        Ok(FilesystemInfo {
            kind: FilesystemKind::from_magic(fs.filesystem_type().0 as i64),
            flags: MsFlags::from_bits_retain(vfs.flags().bits()),
        })
    }

    fn path_exists(&self, path: &Path) -> Result<bool> {
        match std::fs::metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(HookError::FilesystemQuery {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn create_dir(&self, path: &Path, mode: u32) -> Result<()> {
        DirBuilder::new()
            .mode(mode)
            .create(path)
            .map_err(|e| HookError::Io {
                path: path.to_path_buf(),
                source: e,
            })
    }

    fn mount(&self, request: &MountRequest) -> Result<()> {
        mount(
            Some(request.source.as_str()),
            request.target.as_path(),
            request.fstype.as_deref(),
            request.flags,
            request.data.as_deref(),
        )
        .map_err(|e| HookError::Mount {
            target: request.target.clone(),
            source: e.into(),
        })
    }

    fn write_file(&self, path: &Path, contents: &[u8], mode: u32) -> Result<()> {
        let io_err = |e| HookError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(mode)
            .open(path)
            .map_err(io_err)?;
        file.write_all(contents).map_err(io_err)
    }
}

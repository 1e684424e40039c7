//! tmpfs mounts over the directories systemd wants to own.

use std::path::{Path, PathBuf};

use nix::mount::MsFlags;
use systemd_hook_common::constants::{TMPFS_DIR_MODE, TMPFS_OPTIONS, TMPFS_TYPE};
use systemd_hook_common::error::Result;

use crate::host::{HostOps, MountRequest};

/// Builds the tmpfs mount for `target`. Flags and options never vary.
#[must_use]
pub fn tmpfs_request(target: PathBuf) -> MountRequest {
    MountRequest {
        source: TMPFS_TYPE.to_owned(),
        target,
        fstype: Some(TMPFS_TYPE.to_owned()),
        flags: MsFlags::MS_NOSUID | MsFlags::MS_NOEXEC | MsFlags::MS_NODEV,
        data: Some(TMPFS_OPTIONS.to_owned()),
    }
}

/// Ensures `<rootfs>/<relative>` is a directory and mounts tmpfs on it.
///
/// A missing directory is created with mode `0755`; an existing one is used
/// as-is. Nothing is unmounted if the mount fails.
///
/// # Errors
///
/// Returns an error if the path cannot be inspected, the directory cannot
/// be created, or the mount is rejected.
pub fn mount_tmpfs<H: HostOps + ?Sized>(host: &H, rootfs: &Path, relative: &Path) -> Result<()> {
    let target = rootfs.join(relative);
    if !host.path_exists(&target)? {
        host.create_dir(&target, TMPFS_DIR_MODE)?;
        tracing::debug!(path = %target.display(), "created tmpfs mount point");
    }
    host.mount(&tmpfs_request(target.clone()))?;
    tracing::info!(path = %target.display(), options = TMPFS_OPTIONS, "tmpfs mounted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use systemd_hook_common::error::HookError;

    use super::*;
    use crate::host::recording::{HostOp, RecordingHost};

    #[test]
    fn missing_dir_is_created_then_mounted() {
        let host = RecordingHost::new();
        mount_tmpfs(&host, Path::new("/rootfs"), Path::new("run")).expect("provision");

        assert_eq!(
            host.mutations(),
            vec![
                HostOp::CreateDir {
                    path: PathBuf::from("/rootfs/run"),
                    mode: 0o755
                },
                HostOp::Mount(tmpfs_request(PathBuf::from("/rootfs/run"))),
            ]
        );
    }

    #[test]
    fn existing_dir_is_mounted_without_mkdir() {
        let host = RecordingHost::new().with_dir("/rootfs/tmp");
        mount_tmpfs(&host, Path::new("/rootfs"), Path::new("tmp")).expect("provision");

        assert_eq!(
            host.mutations(),
            vec![HostOp::Mount(tmpfs_request(PathBuf::from("/rootfs/tmp")))]
        );
    }

    #[test]
    fn mount_uses_fixed_flags_and_mode() {
        let host = RecordingHost::new();
        mount_tmpfs(&host, Path::new("/rootfs"), Path::new("run/lock")).expect("provision");

        let mounts = host.mounts();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].source, "tmpfs");
        assert_eq!(mounts[0].fstype.as_deref(), Some("tmpfs"));
        assert_eq!(
            mounts[0].flags,
            MsFlags::MS_NOSUID | MsFlags::MS_NOEXEC | MsFlags::MS_NODEV
        );
        assert_eq!(mounts[0].data.as_deref(), Some("mode=1777"));
    }

    #[test]
    fn stat_failure_other_than_absent_is_fatal() {
        let host = RecordingHost::new().deny_stat("/rootfs/run");
        let err = mount_tmpfs(&host, Path::new("/rootfs"), Path::new("run"))
            .expect_err("permission denied");
        assert!(matches!(err, HookError::FilesystemQuery { .. }));
        assert!(host.mutations().is_empty());
    }

    #[test]
    fn mkdir_failure_skips_mount() {
        let host = RecordingHost::new().fail_at("/rootfs/run");
        let err = mount_tmpfs(&host, Path::new("/rootfs"), Path::new("run"))
            .expect_err("mkdir fails");
        assert!(matches!(err, HookError::Io { .. }));
        assert!(host.mounts().is_empty());
    }

    #[test]
    fn mount_failure_is_reported() {
        let host = RecordingHost::new().with_dir("/rootfs/tmp").fail_at("/rootfs/tmp");
        let err = mount_tmpfs(&host, Path::new("/rootfs"), Path::new("tmp"))
            .expect_err("mount fails");
        assert!(matches!(err, HookError::Mount { .. }));
    }
}

//! Read-write remount of the container's systemd cgroup hierarchy.
//!
//! Runtimes commonly mount `/sys/fs/cgroup` read-only inside the container,
//! which stops systemd from creating its own scopes. The hierarchy is bind
//! remounted in place with `MS_RDONLY` cleared.

use std::path::Path;

use nix::mount::MsFlags;
use systemd_hook_common::constants::{CGROUP_MOUNT_SOURCE, CGROUP_SYSTEMD_OPTIONS};
use systemd_hook_common::error::{HookError, Result};

use crate::host::{HostOps, MountRequest};

/// Flags for the remount: the current flags without `MS_RDONLY`, plus
/// `MS_BIND | MS_REMOUNT`. Every other bit is kept.
#[must_use]
pub fn remount_flags(current: MsFlags) -> MsFlags {
    current.difference(MsFlags::MS_RDONLY) | MsFlags::MS_BIND | MsFlags::MS_REMOUNT
}

/// Remounts `<rootfs>/<cgroup_systemd>` read-write.
///
/// Refuses to touch the path unless `statfs(2)` reports a cgroup v1 or v2
/// filesystem there.
///
/// # Errors
///
/// Returns [`HookError::FilesystemQuery`] if the path cannot be queried,
/// [`HookError::NotCgroup`] if it holds another filesystem, and
/// [`HookError::Mount`] if the remount is rejected.
pub fn remount_systemd_cgroup<H: HostOps + ?Sized>(
    host: &H,
    rootfs: &Path,
    cgroup_systemd: &Path,
) -> Result<()> {
    let target = rootfs.join(cgroup_systemd);
    let info = host.filesystem_info(&target)?;
    if !info.kind.is_cgroup() {
        return Err(HookError::NotCgroup {
            path: target,
            magic: info.kind.magic(),
        });
    }

    let flags = remount_flags(info.flags);
    tracing::debug!(
        target = %target.display(),
        kind = ?info.kind,
        current = ?info.flags,
        new = ?flags,
        "remounting systemd cgroup"
    );
    host.mount(&MountRequest {
        source: CGROUP_MOUNT_SOURCE.to_owned(),
        target: target.clone(),
        fstype: None,
        flags,
        data: Some(CGROUP_SYSTEMD_OPTIONS.to_owned()),
    })?;
    tracing::info!(target = %target.display(), "systemd cgroup remounted read-write");
    Ok(())
}

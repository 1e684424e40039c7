//! Orchestration of the systemd preparation steps.
//!
//! Steps run strictly in order: cgroup remount, one tmpfs per layout
//! directory, machine-id. The first failure stops the sequence; mounts made
//! by earlier steps stay in place.

use std::io::Read;
use std::path::Path;

use systemd_hook_common::config::{HookConfig, RootfsLayout};
use systemd_hook_common::error::Result;

use crate::bundle::{BundleSpec, load_bundle_spec};
use crate::cgroup::remount_systemd_cgroup;
use crate::host::HostOps;
use crate::machine_id::write_machine_id;
use crate::state::{InvocationState, read_state};
use crate::tmpfs::mount_tmpfs;

/// Prepares one container rootfs for systemd.
#[derive(Debug)]
pub struct SystemdHook<'a, H: HostOps + ?Sized> {
    host: &'a H,
    layout: &'a RootfsLayout,
}

impl<'a, H: HostOps + ?Sized> SystemdHook<'a, H> {
    /// Creates a hook acting on `host` with the given rootfs layout.
    #[must_use]
    pub const fn new(host: &'a H, layout: &'a RootfsLayout) -> Self {
        Self { host, layout }
    }

    /// Runs every step against the rootfs named by `spec`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first step that fails.
    pub fn enable(&self, state: &InvocationState, spec: &BundleSpec) -> Result<()> {
        let rootfs = spec.rootfs(&state.bundle);
        tracing::info!(
            id = %state.id,
            rootfs = %rootfs.display(),
            "enabling systemd in container"
        );
        self.enable_in(&rootfs, state)
    }

    fn enable_in(&self, rootfs: &Path, state: &InvocationState) -> Result<()> {
        remount_systemd_cgroup(self.host, rootfs, &self.layout.cgroup_systemd)?;
        for dir in &self.layout.tmpfs_dirs {
            mount_tmpfs(self.host, rootfs, dir)?;
        }
        let _ = write_machine_id(self.host, rootfs, &self.layout.machine_id, &state.id)?;
        Ok(())
    }
}

/// Reads the hook state from `input`, loads the bundle, and runs the hook.
///
/// Nothing on the host is touched until both documents decode.
///
/// # Errors
///
/// Returns the first read, decode, or host error encountered.
pub fn run_hook<R: Read, H: HostOps + ?Sized>(
    input: R,
    host: &H,
    config: &HookConfig,
) -> Result<()> {
    config.validate()?;
    let state = read_state(input)?;
    let spec = load_bundle_spec(&state.bundle)?;
    SystemdHook::new(host, &config.layout).enable(&state, &spec)?;
    tracing::info!(id = %state.id, "container prepared for systemd");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use nix::mount::MsFlags;
    use systemd_hook_common::error::HookError;
    use systemd_hook_common::types::ContainerId;

    use super::*;
    use crate::bundle::Root;
    use crate::host::recording::{HostOp, RecordingHost};
    use crate::host::{FilesystemInfo, FilesystemKind};

    fn state(id: &str) -> InvocationState {
        serde_json::from_value(serde_json::json!({ "id": id, "bundle": "/bundle" }))
            .expect("state")
    }

    fn spec(root: &str) -> BundleSpec {
        BundleSpec {
            oci_version: None,
            root: Root {
                path: PathBuf::from(root),
                readonly: false,
            },
        }
    }

    fn cgroup_host(rootfs: &str) -> RecordingHost {
        RecordingHost::new().with_filesystem(
            PathBuf::from(rootfs).join("sys/fs/cgroup/systemd"),
            FilesystemInfo {
                kind: FilesystemKind::CgroupV2,
                flags: MsFlags::MS_RDONLY,
            },
        )
    }

    fn mount_targets(host: &RecordingHost) -> Vec<PathBuf> {
        host.mounts().into_iter().map(|m| m.target).collect()
    }

    #[test]
    fn custom_layout_is_honoured() {
        let layout = RootfsLayout {
            cgroup_systemd: PathBuf::from("cg"),
            tmpfs_dirs: vec![PathBuf::from("scratch")],
            machine_id: PathBuf::from("id"),
        };
        let host = RecordingHost::new().with_filesystem(
            "/r/cg",
            FilesystemInfo {
                kind: FilesystemKind::CgroupV1,
                flags: MsFlags::empty(),
            },
        );
        SystemdHook::new(&host, &layout)
            .enable(&state("c1"), &spec("/r"))
            .expect("enable");

        assert_eq!(
            mount_targets(&host),
            vec![PathBuf::from("/r/cg"), PathBuf::from("/r/scratch")]
        );
        assert!(matches!(
            host.mutations().last(),
            Some(HostOp::WriteFile { path, .. }) if path == &PathBuf::from("/r/id")
        ));
    }

    #[test]
    fn relative_root_is_resolved_against_bundle() {
        let host = cgroup_host("/bundle/rootfs");
        let layout = RootfsLayout::default();
        SystemdHook::new(&host, &layout)
            .enable(&state("c1"), &spec("rootfs"))
            .expect("enable");
        assert_eq!(
            mount_targets(&host)[0],
            PathBuf::from("/bundle/rootfs/sys/fs/cgroup/systemd")
        );
    }

    #[test]
    fn failure_on_run_lock_keeps_run_and_stops() {
        let host = cgroup_host("/r").fail_at("/r/run/lock");
        let layout = RootfsLayout::default();
        let err = SystemdHook::new(&host, &layout)
            .enable(&state("c1"), &spec("/r"))
            .expect_err("run/lock mkdir fails");

        assert!(matches!(err, HookError::Io { ref path, .. } if path == &PathBuf::from("/r/run/lock")));
        assert_eq!(
            mount_targets(&host),
            vec![
                PathBuf::from("/r/sys/fs/cgroup/systemd"),
                PathBuf::from("/r/run"),
            ]
        );
        assert!(
            !host
                .ops()
                .iter()
                .any(|op| matches!(op, HostOp::WriteFile { .. }))
        );
    }

    #[test]
    fn machine_id_uses_container_id() {
        let host = cgroup_host("/r");
        let layout = RootfsLayout::default();
        SystemdHook::new(&host, &layout)
            .enable(&state("deadbeef"), &spec("/r"))
            .expect("enable");
        assert_eq!(
            host.mutations().last(),
            Some(&HostOp::WriteFile {
                path: PathBuf::from("/r/etc/machine-id"),
                contents: ContainerId::new("deadbeef").machine_id().as_bytes().to_vec(),
                mode: 0o644,
            })
        );
    }

    #[test]
    fn invalid_layout_is_rejected_before_reading_input() {
        let mut config = HookConfig::default();
        config.layout.cgroup_systemd = PathBuf::from("/sys/fs/cgroup/systemd");
        let host = RecordingHost::new();
        let err = run_hook(&b"not even json"[..], &host, &config).expect_err("bad layout");
        assert!(matches!(err, HookError::Config { .. }));
        assert!(host.ops().is_empty());
    }
}

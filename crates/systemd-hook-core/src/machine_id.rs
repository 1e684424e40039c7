//! Container `/etc/machine-id` derived from the container ID.

use std::path::Path;

use systemd_hook_common::constants::MACHINE_ID_MODE;
use systemd_hook_common::error::Result;
use systemd_hook_common::types::{ContainerId, MachineId};

use crate::host::HostOps;

/// Writes the machine-id for `id` to `<rootfs>/<relative>`.
///
/// Existing content is replaced; no newline is appended.
///
/// # Errors
///
/// Returns an error if the file cannot be written, e.g. when the image has
/// no `/etc`.
pub fn write_machine_id<H: HostOps + ?Sized>(
    host: &H,
    rootfs: &Path,
    relative: &Path,
    id: &ContainerId,
) -> Result<MachineId> {
    let path = rootfs.join(relative);
    let machine_id = id.machine_id();
    host.write_file(&path, machine_id.as_bytes(), MACHINE_ID_MODE)?;
    tracing::info!(path = %path.display(), machine_id = %machine_id, "machine-id written");
    Ok(machine_id)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    #[cfg(target_os = "linux")]
    use systemd_hook_common::error::HookError;

    use super::*;
    #[cfg(target_os = "linux")]
    use crate::host::linux::LinuxHost;
    use crate::host::recording::{HostOp, RecordingHost};

    #[test]
    fn writes_truncated_id_with_fixed_mode() {
        let host = RecordingHost::new();
        let id = ContainerId::new("abcdef0123456789abcdef0123456789extra");
        let written =
            write_machine_id(&host, Path::new("/rootfs"), Path::new("etc/machine-id"), &id)
                .expect("write");

        assert_eq!(written.as_str(), "abcdef0123456789abcdef0123456789");
        assert_eq!(
            host.ops(),
            vec![HostOp::WriteFile {
                path: PathBuf::from("/rootfs/etc/machine-id"),
                contents: b"abcdef0123456789abcdef0123456789".to_vec(),
                mode: 0o644,
            }]
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn overwrites_existing_file_without_newline() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("etc")).expect("mkdir etc");
        let target = dir.path().join("etc/machine-id");
        std::fs::write(&target, "ffffffffffffffffffffffffffffffff\n").expect("seed");

        let id = ContainerId::new("0123456789abcdef0123456789abcdef0123");
        let _ = write_machine_id(&LinuxHost::new(), dir.path(), Path::new("etc/machine-id"), &id)
            .expect("write");

        assert_eq!(
            std::fs::read_to_string(&target).expect("read"),
            "0123456789abcdef0123456789abcdef"
        );
    }

    // Current behavior, not a contract: short ids are written unpadded.
    #[cfg(target_os = "linux")]
    #[test]
    fn short_id_is_written_as_is() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("etc")).expect("mkdir etc");

        let id = ContainerId::new("c1");
        let _ = write_machine_id(&LinuxHost::new(), dir.path(), Path::new("etc/machine-id"), &id)
            .expect("write");

        assert_eq!(
            std::fs::read(dir.path().join("etc/machine-id")).expect("read"),
            b"c1"
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn missing_etc_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = write_machine_id(
            &LinuxHost::new(),
            dir.path(),
            Path::new("etc/machine-id"),
            &ContainerId::new("c1"),
        )
        .expect_err("no /etc in image");
        assert!(matches!(err, HookError::Io { .. }));
    }
}

//! Fixed paths, modes, and kernel constants used by the hook.

/// Log sink the hook appends to; the runtime's standard streams are not used.
pub const DEFAULT_LOG_FILE: &str = "/var/log/hook.log";

/// Default tracing level when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "debug";

/// Name of the bundle configuration file inside the bundle directory.
pub const BUNDLE_CONFIG_FILE: &str = "config.json";

/// systemd cgroup hierarchy, relative to the container rootfs.
pub const CGROUP_SYSTEMD_PATH: &str = "sys/fs/cgroup/systemd";

/// Source name passed to `mount(2)` when remounting the systemd cgroup.
pub const CGROUP_MOUNT_SOURCE: &str = "cgroup";

/// Mount data identifying the named systemd hierarchy on remount.
pub const CGROUP_SYSTEMD_OPTIONS: &str = "name=systemd";

/// Directories mounted as tmpfs, relative to the rootfs, in mount order.
pub const TMPFS_DIRS: [&str; 3] = ["run", "run/lock", "tmp"];

/// Source and filesystem type for tmpfs mounts.
pub const TMPFS_TYPE: &str = "tmpfs";

/// Mount data for every tmpfs: world-writable with the sticky bit.
pub const TMPFS_OPTIONS: &str = "mode=1777";

/// Mode for tmpfs mount points created by the hook.
pub const TMPFS_DIR_MODE: u32 = 0o755;

/// Machine identity file, relative to the rootfs.
pub const MACHINE_ID_PATH: &str = "etc/machine-id";

/// Mode of the written machine-id file.
pub const MACHINE_ID_MODE: u32 = 0o644;

/// Number of container-id characters kept for the machine-id.
pub const MACHINE_ID_LENGTH: usize = 32;

/// `statfs(2)` magic of a cgroup v1 hierarchy.
pub const CGROUP_SUPER_MAGIC: i64 = 0x0027_e0eb;

/// `statfs(2)` magic of the cgroup v2 unified hierarchy.
pub const CGROUP2_SUPER_MAGIC: i64 = 0x6367_7270;

/// Binary name installed into the runtime's hooks directory.
pub const BIN_NAME: &str = "oci-systemd-hook";

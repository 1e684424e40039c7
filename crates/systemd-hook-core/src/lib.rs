//! # systemd-hook-core
//!
//! Host-side preparation of a container rootfs so that systemd can run as
//! PID 1 inside it. Invoked once per container, before its main process
//! starts, this crate:
//! - reads the runtime's hook state and the bundle's `config.json`,
//! - remounts the container's systemd cgroup hierarchy read-write,
//! - mounts tmpfs on `run`, `run/lock`, and `tmp`,
//! - writes `etc/machine-id` from the container ID.
//!
//! Every host mutation goes through the [`host::HostOps`] trait so the
//! sequence can be exercised without root via [`host::recording`].

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod bundle;
pub mod cgroup;
pub mod hook;
pub mod host;
pub mod machine_id;
pub mod state;
pub mod tmpfs;

//! # oci-systemd-hook
//!
//! OCI prestart hook that makes a container able to run systemd as PID 1.
//! The runtime pipes the container state to stdin; the hook logs to a file
//! and reports only through its exit status.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

mod args;
mod logging;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use systemd_hook_common::config::HookConfig;
use systemd_hook_common::constants::BIN_NAME;
use systemd_hook_common::error::Result;

use crate::args::Cli;

#[allow(clippy::print_stderr)]
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Until the log sink is up, stderr is the only channel left.
    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{BIN_NAME}: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::init(&config) {
        eprintln!("{BIN_NAME}: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let cause = format!("{e:#}");
            tracing::error!(error = %cause, "hook failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &HookConfig) -> anyhow::Result<()> {
    tracing::info!(
        stage = ?cli.stage,
        log_file = %config.log_file.display(),
        version = env!("CARGO_PKG_VERSION"),
        "hook invoked"
    );
    prepare_rootfs(config).context("failed to prepare container for systemd")
}

#[cfg(target_os = "linux")]
fn prepare_rootfs(config: &HookConfig) -> Result<()> {
    use systemd_hook_core::hook::run_hook;
    use systemd_hook_core::host::linux::LinuxHost;

    run_hook(std::io::stdin().lock(), &LinuxHost::new(), config)
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error; mounting into a container rootfs requires Linux.
#[cfg(not(target_os = "linux"))]
fn prepare_rootfs(_config: &HookConfig) -> Result<()> {
    Err(systemd_hook_common::error::HookError::Config {
        message: "Linux required to prepare a container rootfs".into(),
    })
}

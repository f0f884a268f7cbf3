// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `fsd` command surface: mount/unmount/list the supervised
//! filesystems, and manage the background daemon's lifecycle.

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "fsd", version, about = "Mount content-addressed stores as host filesystems", styles = crate::color::styles())]
pub struct Cli {
    /// Output format for machine consumption.
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mount one or more targets.
    Mount(MountArgs),
    /// Unmount one or more targets.
    Unmount(UnmountArgs),
    /// List active mounts.
    List,
    /// Manage the background daemon.
    Service(ServiceArgs),
}

#[derive(Args)]
pub struct MountArgs {
    /// Host paths to mount (e.g. `/mnt/ipfs`).
    #[arg(required = true)]
    pub targets: Vec<String>,

    /// Host integration to mount through (e.g. `fuse`).
    #[arg(long = "system")]
    pub host_api: Option<String>,

    /// Logical filesystem to expose (`ipfs`, `ipns`, `pinfs`).
    #[arg(long = "fs")]
    pub fs_id: Option<String>,

    /// IPFS backend address, overriding the configured default.
    #[arg(long)]
    pub ipfs: Option<String>,

    /// Candidate daemon addresses to dial (repeatable), highest priority first.
    #[arg(long = "address")]
    pub addresses: Vec<String>,
}

#[derive(Args)]
pub struct UnmountArgs {
    /// Targets to unmount.
    pub targets: Vec<String>,

    /// Unmount every active mount.
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Candidate daemon addresses to dial (repeatable), highest priority first.
    #[arg(long = "address")]
    pub addresses: Vec<String>,
}

#[derive(Args)]
pub struct ServiceArgs {
    #[command(subcommand)]
    pub command: ServiceCommand,
}

#[derive(Subcommand)]
pub enum ServiceCommand {
    /// Install the daemon with the host's service manager.
    Install,
    /// Remove the daemon from the host's service manager.
    Uninstall,
    /// Start the installed service.
    Start,
    /// Stop the running service.
    Stop,
    /// Stop then start the service.
    Restart,
    /// Report the service's install/run state.
    Status,
    /// Run the daemon in the current process (used internally when the
    /// CLI auto-spawns a daemon; also usable directly for debugging).
    Run {
        /// Listener addresses to bind (repeatable). Defaults to the
        /// user/system XDG socket when none are given.
        #[arg(long = "address")]
        addresses: Vec<String>,

        /// Idle-exit period (e.g. `5m`); disabled when omitted.
        #[arg(long)]
        auto_exit: Option<String>,
    },
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: where its state lives on disk.

use std::path::PathBuf;

use fsd_core::{xdg, Address};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a state directory for the daemon")]
    NoStateDir,
}

/// Resolved filesystem locations for one daemon instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. `~/.local/state/fsd`).
    pub state_dir: PathBuf,
    /// Default listener address, used when the caller supplies none.
    pub default_address: Address,
    /// Path to the exclusive lock/PID file.
    pub lock_path: PathBuf,
    /// Directory daemon logs are rotated into.
    pub log_dir: PathBuf,
}

const SERVICE: &str = "fsd";
const SERVER: &str = "daemon";

impl Config {
    /// Load configuration for the user-level daemon: state under XDG
    /// state/runtime directories, falling back to the fixed system root
    /// when no user session directory is available.
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = xdg::user_state_dir()
            .map(|d| d.join(SERVICE))
            .ok_or(ConfigError::NoStateDir)?;

        let default_address = xdg::user_default_socket(SERVICE, SERVER)
            .unwrap_or_else(|| xdg::system_default_socket(SERVICE, SERVER));

        Ok(Self {
            lock_path: state_dir.join("daemon.pid"),
            log_dir: state_dir.join("logs"),
            state_dir,
            default_address,
        })
    }
}

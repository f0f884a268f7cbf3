// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The interface the `service install`/`start`/`stop`/`uninstall` CLI
//! subcommands drive. The actual OS service manager (systemd, launchd,
//! the Windows Service Control Manager) is a platform integration this
//! crate doesn't own; this module only specifies the boundary and a
//! no-op implementation for platforms or tests with nothing real to
//! drive.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceManagerError {
    #[error("service is not installed")]
    NotInstalled,
    #[error("service is already installed")]
    AlreadyInstalled,
    #[error("platform service manager error: {0}")]
    Platform(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRunState {
    NotInstalled,
    Stopped,
    Running,
}

/// Installs, starts, stops, and queries a long-running service entry
/// with the host OS's service manager.
#[async_trait]
pub trait ServiceManager: Send + Sync {
    async fn install(&self) -> Result<(), ServiceManagerError>;
    async fn uninstall(&self) -> Result<(), ServiceManagerError>;
    async fn start(&self) -> Result<(), ServiceManagerError>;
    async fn stop(&self) -> Result<(), ServiceManagerError>;
    async fn status(&self) -> Result<ServiceRunState, ServiceManagerError>;
}

/// A service manager that tracks installation state in memory only.
/// Used in tests and on platforms where no real integration is wired up.
#[derive(Default)]
pub struct NullServiceManager {
    state: parking_lot::Mutex<ServiceRunState>,
}

impl NullServiceManager {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ServiceManager for NullServiceManager {
    async fn install(&self) -> Result<(), ServiceManagerError> {
        let mut state = self.state.lock();
        if *state != ServiceRunState::NotInstalled {
            return Err(ServiceManagerError::AlreadyInstalled);
        }
        *state = ServiceRunState::Stopped;
        Ok(())
    }

    async fn uninstall(&self) -> Result<(), ServiceManagerError> {
        let mut state = self.state.lock();
        if *state == ServiceRunState::NotInstalled {
            return Err(ServiceManagerError::NotInstalled);
        }
        *state = ServiceRunState::NotInstalled;
        Ok(())
    }

    async fn start(&self) -> Result<(), ServiceManagerError> {
        let mut state = self.state.lock();
        if *state == ServiceRunState::NotInstalled {
            return Err(ServiceManagerError::NotInstalled);
        }
        *state = ServiceRunState::Running;
        Ok(())
    }

    async fn stop(&self) -> Result<(), ServiceManagerError> {
        let mut state = self.state.lock();
        if *state == ServiceRunState::NotInstalled {
            return Err(ServiceManagerError::NotInstalled);
        }
        *state = ServiceRunState::Stopped;
        Ok(())
    }

    async fn status(&self) -> Result<ServiceRunState, ServiceManagerError> {
        Ok(*self.state.lock())
    }
}

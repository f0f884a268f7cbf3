// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The interactive driver: runs the daemon in the current process,
//! performing the stdio handshake before switching to file-based
//! logging, then serving until Ctrl-C/SIGTERM or the idle watchdog
//! requests shutdown.

use std::sync::Arc;
use std::time::Duration;

use fsd_core::{Address, ServiceStatus};
use fsd_mount::{BackendFactory, BinderFactory};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::lifecycle::{run_idle_watchdog, Lifecycle};
use crate::listener_set::ListenerSet;
use crate::lock::InstanceLock;
use crate::server::{self, AppState};

pub struct InteractiveOptions {
    pub addresses: Vec<Address>,
    pub auto_exit: Option<Duration>,
    pub binder_factory: Arc<dyn BinderFactory>,
    pub backend_factory: Arc<dyn BackendFactory>,
    pub backend_identifier: String,
    pub version: String,
}

/// Run the daemon to completion in the current process. Returns once a
/// shutdown signal (Ctrl-C, SIGTERM, or idle timeout) has been handled
/// and every listener has stopped accepting connections.
pub async fn run(config: &Config, options: InteractiveOptions) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    fsd_wire::write_status(&mut stdout, &ServiceStatus::Starting).await?;

    let _instance_lock = match InstanceLock::acquire(&config.lock_path) {
        Ok(lock) => lock,
        Err(err) => {
            fsd_wire::write_status(&mut stdout, &ServiceStatus::Error { reason: err.to_string() })
                .await?;
            return Err(err.into());
        }
    };

    let listeners = match ListenerSet::bind_all(&options.addresses).await {
        Ok(listeners) => listeners,
        Err(err) => {
            fsd_wire::write_status(&mut stdout, &ServiceStatus::Error { reason: err.to_string() })
                .await?;
            return Err(err.into());
        }
    };

    for address in listeners.addresses() {
        fsd_wire::write_status(&mut stdout, &ServiceStatus::ready_with(address)).await?;
    }
    fsd_wire::write_status(&mut stdout, &ServiceStatus::ready_sentinel()).await?;

    // Stdout is free of handshake traffic from here on; logging moves to
    // a rotating file so it can't be mistaken for more handshake records.
    let _log_guard = crate::logging::init_file_logging(&config.log_dir)?;
    info!(addresses = ?options.addresses, "daemon ready");

    let listener_addresses = listeners.addresses().iter().map(|a| a.to_string()).collect();
    let shutdown = CancellationToken::new();
    let state = Arc::new(AppState::new(
        options.binder_factory,
        options.backend_factory,
        options.backend_identifier,
        options.version,
        listener_addresses,
        shutdown.clone(),
    ));
    let lifecycle = Lifecycle::new();
    lifecycle.start()?;

    tokio::spawn(wait_for_signal(shutdown.clone()));
    tokio::spawn(run_idle_watchdog(Arc::clone(&state), options.auto_exit, shutdown.clone()));

    server::serve(listeners, state, shutdown).await?;
    lifecycle.stop()?;
    info!("daemon stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal(shutdown: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(_) => return,
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
    shutdown.cancel();
}

#[cfg(not(unix))]
async fn wait_for_signal(shutdown: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    shutdown.cancel();
}

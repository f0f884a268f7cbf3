// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use fsd_core::SettingsFlags;
use fsd_daemon::{InteractiveOptions, NullServiceManager, ServiceManager, ServiceRunState};
use fsd_wire::{Request, Response};

use crate::cli::ServiceCommand;
use crate::executor::ExecutorError;
use crate::output::{format_or_json, OutputFormat};

pub async fn run(command: ServiceCommand, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        ServiceCommand::Install => {
            service_manager().install().await?;
            println!("Service installed");
            Ok(())
        }
        ServiceCommand::Uninstall => {
            service_manager().uninstall().await?;
            println!("Service uninstalled");
            Ok(())
        }
        ServiceCommand::Start => {
            service_manager().start().await?;
            println!("Service started");
            Ok(())
        }
        ServiceCommand::Stop => stop().await,
        ServiceCommand::Restart => restart().await,
        ServiceCommand::Status => status(format).await,
        ServiceCommand::Run { addresses, auto_exit } => run_in_process(addresses, auto_exit).await,
    }
}

/// The host's real service manager (systemd, launchd, the Windows SCM) is
/// a platform integration this crate doesn't own; this constructs the
/// boundary it was built against rather than a platform integration.
fn service_manager() -> NullServiceManager {
    NullServiceManager::new()
}

/// Stop the daemon without ever auto-spawning one just to tell it to
/// stop. If an interactively running daemon answers, ask it over RPC to
/// shut itself down; otherwise fall back to the platform service
/// manager, for the case where the daemon runs as an installed system
/// service instead.
async fn stop() -> anyhow::Result<()> {
    if stop_if_running().await? {
        println!("Service stopped");
    } else {
        println!("Service not running");
    }
    Ok(())
}

/// Stop then start the service. Not running is not an error — restart
/// should work whether or not a daemon already happened to be up.
async fn restart() -> anyhow::Result<()> {
    let was_running = stop_if_running().await?;
    if was_running {
        // Grace period for the OS to release the unix socket / TCP port
        // the stopped daemon was bound to before a new one claims it.
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    }
    service_manager().start().await?;
    println!("Service restarted");
    Ok(())
}

/// Returns `true` if a daemon was actually running and has now been
/// asked to stop; `false` if nothing was found to stop.
async fn stop_if_running() -> anyhow::Result<bool> {
    let settings = super::merge_settings(SettingsFlags::default())?;

    match crate::executor::connect_if_live(&settings).await {
        Ok(client) => {
            match client.call(&Request::Stop).await? {
                Response::Ok => Ok(true),
                Response::Error { message } => anyhow::bail!(message),
                other => anyhow::bail!("unexpected daemon response: {other:?}"),
            }
        }
        Err(ExecutorError::NotLive { .. }) => match service_manager().stop().await {
            Ok(()) => Ok(true),
            Err(fsd_daemon::ServiceManagerError::NotInstalled) => Ok(false),
            Err(err) => Err(err.into()),
        },
        Err(err) => Err(err.into()),
    }
}

/// Report controller status plus live listener addresses (spec.md §6):
/// query a live interactive daemon over RPC first, since it knows its
/// own bound addresses; fall back to the platform service manager's
/// install/run state when nothing answers on the wire.
async fn status(format: OutputFormat) -> anyhow::Result<()> {
    let settings = super::merge_settings(SettingsFlags::default())?;

    match crate::executor::connect_if_live(&settings).await {
        Ok(client) => match client.call(&Request::Hello).await? {
            Response::Hello { version, addresses } => {
                let obj = serde_json::json!({
                    "status": "running",
                    "version": version,
                    "addresses": addresses,
                });
                format_or_json(format, &obj, || {
                    println!("Service status: running");
                    println!("Version: {version}");
                    for address in &addresses {
                        println!("Listening on: {address}");
                    }
                })
            }
            other => anyhow::bail!("unexpected daemon response: {other:?}"),
        },
        Err(ExecutorError::NotLive { .. }) => {
            let state = service_manager().status().await?;
            format_or_json(format, &run_state_label(state), || {
                println!("Service status: {}", run_state_label(state))
            })
        }
        Err(err) => Err(err.into()),
    }
}

fn run_state_label(state: ServiceRunState) -> String {
    match state {
        ServiceRunState::NotInstalled => "not installed".to_string(),
        ServiceRunState::Stopped => "stopped".to_string(),
        ServiceRunState::Running => "running".to_string(),
    }
}

async fn run_in_process(addresses: Vec<String>, auto_exit: Option<String>) -> anyhow::Result<()> {
    let flags = SettingsFlags {
        addresses: (!addresses.is_empty()).then_some(addresses),
        auto_exit,
        ..Default::default()
    };
    let settings = super::merge_settings(flags)?;
    let config = fsd_daemon::Config::load()?;

    // spec.md §4.2 step 2: explicit addresses win outright; otherwise
    // prefer whatever the platform service manager already bound for us
    // (systemd socket activation, a pre-created Windows service
    // directory) before synthesizing the XDG default. No real platform
    // integration is wired up here (out of scope per spec.md §1), so
    // `NullSocketSource` always defers to the default.
    let socket_source = fsd_daemon::NullSocketSource;
    let bind_addresses = if !settings.addresses.is_empty() {
        settings.addresses
    } else {
        let inherited = fsd_daemon::SocketSource::inherited_listeners(&socket_source);
        if !inherited.is_empty() { inherited } else { vec![config.default_address.clone()] }
    };

    let options = InteractiveOptions {
        addresses: bind_addresses,
        auto_exit: settings.auto_exit,
        binder_factory: Arc::new(fsd_mount::NullBinderFactory),
        backend_factory: Arc::new(fsd_mount::NullBackendFactory),
        backend_identifier: "default".to_string(),
        version: concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH")).to_string(),
    };

    fsd_daemon::run(&config, options).await
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatches one RPC call against a live daemon, auto-spawning one if
//! none answers: probe every candidate address, and if none is alive,
//! fork `fsd service run` in the background and wait for its stdio
//! handshake before dialing it.
//!
//! The "stop" command is special-cased: it must never trigger an
//! auto-spawn (spawning a daemon just to tell it to stop is pointless),
//! so it uses [`connect_if_live`] instead of [`connect_or_spawn`].

use std::time::Duration;

use fsd_core::{Address, Settings};
use fsd_wire::{Handshake, HandshakeError, RpcClient};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

const HANDSHAKE_DEADLINE: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("no daemon address is configured and none could be derived")]
    NoAddressConfigured,
    #[error(
        "could not reach or start a daemon (tried: {}): {source}",
        attempted.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    CouldNotConnect { attempted: Vec<Address>, #[source] source: Box<ExecutorError> },
    #[error(
        "no daemon is listening (tried: {})",
        attempted.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    NotLive { attempted: Vec<Address> },
    #[error(
        "could not connect (tried: {}); not auto-spawning because these addresses were explicitly configured",
        attempted.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    CouldNotConnectExplicit { attempted: Vec<Address> },
    #[error("failed to spawn the daemon process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("daemon failed its startup handshake: {0}")]
    Handshake(#[from] HandshakeError),
    #[error("daemon reported a fatal startup error on stderr: {0}")]
    StderrFatal(String),
    #[error("daemon RPC error: {0}")]
    Client(#[from] fsd_wire::ClientError),
}

/// A command's declarative routing preference: `no_remote` means "must
/// run in this process", `no_local` means "must run in a daemon
/// process". Every command in this CLI's surface sets `no_local` (mount,
/// unmount, list, and `service run` all force the daemon path), so the
/// in-process branch below is presently unreached by any real command —
/// it exists because the dispatch decision procedure names it as step 1
/// regardless, and a future local-only command (e.g. a `doctor` command
/// that never needs the daemon) would wire into it without touching the
/// remote path at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandFlags {
    pub no_remote: bool,
    pub no_local: bool,
}

/// The result of dispatching a command: either it must run in this
/// process, or a client for a live (possibly just-spawned) daemon.
pub enum Executor {
    InProcess,
    Remote(RpcClient),
}

/// Step 1 of the dispatch decision procedure: `NoRemote`, or the absence
/// of `NoLocal`, short-circuits straight to an in-process executor
/// without looking at any candidate address. Otherwise falls through to
/// [`connect_or_spawn`].
pub async fn dispatch(flags: CommandFlags, settings: &Settings) -> Result<Executor, ExecutorError> {
    if flags.no_remote || !flags.no_local {
        return Ok(Executor::InProcess);
    }
    connect_or_spawn(settings).await.map(Executor::Remote)
}

/// Connect to a live daemon at one of `settings`'s candidate addresses,
/// spawning one in the background if none answers. Auto-spawn only
/// fires when the candidates came from the built-in XDG default set —
/// if the caller explicitly configured addresses and none of them are
/// live, that's a hard failure, not a cue to start a brand-new daemon
/// somewhere the caller didn't ask for.
pub async fn connect_or_spawn(settings: &Settings) -> Result<RpcClient, ExecutorError> {
    let candidates = candidate_addresses(settings);
    if candidates.addresses.is_empty() {
        return Err(ExecutorError::NoAddressConfigured);
    }

    if let Some(client) = probe_all(&candidates.addresses).await {
        return Ok(client);
    }

    if !candidates.is_default {
        return Err(ExecutorError::CouldNotConnectExplicit { attempted: candidates.addresses });
    }

    spawn_and_wait(&candidates.addresses[0]).await.map_err(|source| ExecutorError::CouldNotConnect {
        attempted: candidates.addresses,
        source: Box::new(source),
    })
}

/// Connect to a live daemon only — never auto-spawn. Used by the `stop`
/// command, which must not spawn a daemon just to tell it to stop.
pub async fn connect_if_live(settings: &Settings) -> Result<RpcClient, ExecutorError> {
    let candidates = candidate_addresses(settings);
    if candidates.addresses.is_empty() {
        return Err(ExecutorError::NoAddressConfigured);
    }
    probe_all(&candidates.addresses).await.ok_or(ExecutorError::NotLive { attempted: candidates.addresses })
}

async fn probe_all(candidates: &[Address]) -> Option<RpcClient> {
    for address in candidates {
        if RpcClient::probe(address).await {
            return RpcClient::dial(address).ok();
        }
    }
    None
}

/// A candidate address list, tagged with whether it came from the
/// user/settings-supplied list or was synthesized from XDG defaults.
/// Auto-spawn eligibility (spec step 5) depends on which it was.
struct Candidates {
    addresses: Vec<Address>,
    is_default: bool,
}

fn candidate_addresses(settings: &Settings) -> Candidates {
    if !settings.addresses.is_empty() {
        return Candidates { addresses: settings.addresses.clone(), is_default: false };
    }
    let addresses = fsd_core::xdg::user_default_socket("fsd", "daemon")
        .into_iter()
        .chain(std::iter::once(fsd_core::xdg::system_default_socket("fsd", "daemon")))
        .collect();
    Candidates { addresses, is_default: true }
}

async fn spawn_and_wait(requested: &Address) -> Result<RpcClient, ExecutorError> {
    let exe = find_fsd_binary();
    let mut child = Command::new(&exe)
        .arg("service")
        .arg("run")
        .arg("--address")
        .arg(requested.to_string())
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .map_err(ExecutorError::Spawn)?;

    let Some(stdout) = child.stdout.take() else {
        let _ = child.start_kill();
        return Err(ExecutorError::Spawn(std::io::Error::other("daemon stdout was not piped")));
    };
    let Some(stderr) = child.stderr.take() else {
        let _ = child.start_kill();
        return Err(ExecutorError::Spawn(std::io::Error::other("daemon stderr was not piped")));
    };

    // Any output on stderr during the handshake is fatal, so the
    // handshake read and a first-line stderr read race each other. If
    // stderr closes clean (no line written), keep waiting on the
    // handshake alone until it resolves or its own deadline fires.
    let handshake_fut = fsd_wire::read_handshake(BufReader::new(stdout), HANDSHAKE_DEADLINE);
    let stderr_fut = read_first_stderr_line(stderr);
    tokio::pin!(handshake_fut);
    tokio::pin!(stderr_fut);

    let mut stderr_done = false;
    let handshake = loop {
        tokio::select! {
            handshake = &mut handshake_fut => break handshake,
            line = &mut stderr_fut, if !stderr_done => {
                match line {
                    Some(line) => {
                        let _ = child.start_kill();
                        return Err(ExecutorError::StderrFatal(line));
                    }
                    None => stderr_done = true,
                }
            }
        }
    };

    match handshake {
        Ok(records) => {
            let dial_target = records
                .into_iter()
                .find_map(|r| match r {
                    Handshake::Ready(addr) => Some(addr),
                    Handshake::ReadySentinel => None,
                })
                .unwrap_or_else(|| requested.clone());
            detach(child);
            RpcClient::dial(&dial_target).map_err(ExecutorError::from)
        }
        Err(err) => {
            let _ = child.start_kill();
            Err(ExecutorError::Handshake(err))
        }
    }
}

async fn read_first_stderr_line(stderr: impl tokio::io::AsyncRead + Unpin) -> Option<String> {
    let mut reader = BufReader::new(stderr);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => return None,
            Ok(_) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
            Err(_) => return None,
        }
    }
}

/// Let the spawned daemon keep running after the CLI exits.
fn detach(child: Child) {
    drop(child);
}

fn find_fsd_binary() -> std::path::PathBuf {
    std::env::current_exe().unwrap_or_else(|_| std::path::PathBuf::from("fsd"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn explicit_addresses_never_auto_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let addr = Address::unix(dir.path().join("nobody-home.sock"));
        let settings = Settings { addresses: vec![addr.clone()], ..Default::default() };

        let err = connect_or_spawn(&settings).await.unwrap_err();
        match err {
            ExecutorError::CouldNotConnectExplicit { attempted } => {
                assert_eq!(attempted, vec![addr]);
            }
            other => panic!("expected CouldNotConnectExplicit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_configured_address_is_an_error_before_any_probe() {
        let settings = Settings { addresses: vec![], ..Default::default() };
        // No explicit addresses and no reachable XDG default in a clean
        // test environment means either NoAddressConfigured (no default
        // could be derived) or a default-set CouldNotConnect — never the
        // explicit-address variant, since nothing was configured.
        let err = connect_if_live(&settings).await.unwrap_err();
        assert!(!matches!(err, ExecutorError::CouldNotConnectExplicit { .. }));
    }

    #[test]
    fn candidate_addresses_marks_explicit_list_as_non_default() {
        let addr: Address = "/unix/tmp/fsd.sock".parse().unwrap();
        let settings = Settings { addresses: vec![addr], ..Default::default() };
        let candidates = candidate_addresses(&settings);
        assert!(!candidates.is_default);
        assert_eq!(candidates.addresses.len(), 1);
    }

    #[tokio::test]
    async fn no_remote_forces_in_process_regardless_of_candidates() {
        let settings = Settings::default();
        let flags = CommandFlags { no_remote: true, no_local: false };
        assert!(matches!(dispatch(flags, &settings).await.unwrap(), Executor::InProcess));
    }

    #[tokio::test]
    async fn missing_no_local_forces_in_process_even_with_explicit_addresses() {
        let addr: Address = "/unix/tmp/fsd.sock".parse().unwrap();
        let settings = Settings { addresses: vec![addr], ..Default::default() };
        let flags = CommandFlags { no_remote: false, no_local: false };
        assert!(matches!(dispatch(flags, &settings).await.unwrap(), Executor::InProcess));
    }

    #[tokio::test]
    async fn no_local_without_no_remote_takes_the_remote_path() {
        let dir = tempfile::tempdir().unwrap();
        let addr = Address::unix(dir.path().join("nobody-home.sock"));
        let settings = Settings { addresses: vec![addr], ..Default::default() };
        let flags = CommandFlags { no_remote: false, no_local: true };
        let err = match dispatch(flags, &settings).await {
            Ok(_) => panic!("expected the remote path to fail against an empty socket dir"),
            Err(err) => err,
        };
        assert!(matches!(err, ExecutorError::CouldNotConnectExplicit { .. }));
    }

    #[test]
    fn candidate_addresses_falls_back_to_xdg_defaults() {
        let settings = Settings::default();
        let candidates = candidate_addresses(&settings);
        assert!(candidates.is_default);
        assert!(!candidates.addresses.is_empty());
    }
}

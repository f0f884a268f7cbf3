// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's own start/stop state machine, independent of whatever is
//! driving it (interactive process or OS service manager).

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::server::AppState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("the daemon is already running")]
    AlreadyRunning,
    #[error("the daemon is not running")]
    NotRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running,
}

/// Tracks whether the daemon is currently serving requests. `Start` and
/// `Stop` are mutually exclusive: starting an already-running daemon, or
/// stopping an idle one, is an error rather than a silent no-op (spec
/// §4.2 — callers rely on these errors to distinguish "already done" from
/// "just did it").
pub struct Lifecycle {
    state: Mutex<RunState>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self { state: Mutex::new(RunState::Idle) }
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Result<(), LifecycleError> {
        let mut guard = self.state.lock();
        if *guard == RunState::Running {
            return Err(LifecycleError::AlreadyRunning);
        }
        *guard = RunState::Running;
        Ok(())
    }

    pub fn stop(&self) -> Result<(), LifecycleError> {
        let mut guard = self.state.lock();
        if *guard == RunState::Idle {
            return Err(LifecycleError::NotRunning);
        }
        *guard = RunState::Idle;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        *self.state.lock() == RunState::Running
    }
}

/// Poll `state` and cancel `shutdown` once the daemon has had no activity
/// for `interval` and has no active mounts. Disabled entirely when
/// `interval` is `None` — auto-exit is opt-in.
pub async fn run_idle_watchdog(
    state: Arc<AppState>,
    interval: Option<Duration>,
    shutdown: CancellationToken,
) {
    let Some(interval) = interval else {
        return;
    };
    let poll_period = (interval / 4).max(Duration::from_millis(250));
    let mut ticker = tokio::time::interval(poll_period);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = ticker.tick() => {
                if state.is_busy() {
                    continue;
                }
                if state.idle_for_ms() as u128 >= interval.as_millis() {
                    info!(idle_ms = state.idle_for_ms(), "idle deadline exceeded, shutting down");
                    shutdown.cancel();
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_then_start_again_is_already_running() {
        let lifecycle = Lifecycle::new();
        lifecycle.start().unwrap();
        assert_eq!(lifecycle.start(), Err(LifecycleError::AlreadyRunning));
    }

    #[test]
    fn stop_without_start_is_not_running() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.stop(), Err(LifecycleError::NotRunning));
    }

    #[test]
    fn start_then_stop_round_trips() {
        let lifecycle = Lifecycle::new();
        lifecycle.start().unwrap();
        assert!(lifecycle.is_running());
        lifecycle.stop().unwrap();
        assert!(!lifecycle.is_running());
    }

    #[tokio::test]
    async fn watchdog_does_nothing_when_disabled() {
        let state = Arc::new(AppState::new(
            Arc::new(fsd_mount::NullBinderFactory),
            Arc::new(fsd_mount::NullBackendFactory),
            "default".to_string(),
            "0.2.0".to_string(),
            vec![],
            CancellationToken::new(),
        ));
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();
        let handle = tokio::spawn(run_idle_watchdog(state, None, shutdown_clone));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!shutdown.is_cancelled());
        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn watchdog_cancels_after_idle_deadline() {
        let state = Arc::new(AppState::new(
            Arc::new(fsd_mount::NullBinderFactory),
            Arc::new(fsd_mount::NullBackendFactory),
            "default".to_string(),
            "0.2.0".to_string(),
            vec![],
            CancellationToken::new(),
        ));
        let shutdown = CancellationToken::new();
        run_idle_watchdog(Arc::clone(&state), Some(Duration::from_millis(10)), shutdown.clone()).await;
        assert!(shutdown.is_cancelled());
    }
}

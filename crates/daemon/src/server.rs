// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The HTTP-RPC server: one `POST /rpc` endpoint, served over every
//! listener in a [`ListenerSet`] concurrently, behind a single shared
//! [`AppState`].

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use fsd_mount::{BackendFactory, BinderFactory, MountContext, Registry};
use fsd_wire::{MountEntry, Request, Response};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::listener_set::{BoundListener, ListenerSet};

/// Everything the `/rpc` handler needs, shared across every listener task.
pub struct AppState {
    pub registry: Registry,
    pub binder_cache: fsd_mount::BinderCache,
    pub backend_cache: fsd_mount::BackendClientCache,
    pub binder_factory: Arc<dyn BinderFactory>,
    pub backend_factory: Arc<dyn BackendFactory>,
    pub backend_identifier: String,
    pub version: String,
    /// Every address this daemon is currently listening on, reported back
    /// over `Request::Hello` for `service status`.
    pub listener_addresses: Vec<String>,
    /// Cancelled when a `Request::Stop` RPC asks this daemon to shut
    /// itself down — the path `service stop` takes against an
    /// interactively running, not-system-service-installed daemon.
    pub shutdown: CancellationToken,
    last_activity_unix_ms: AtomicI64,
}

impl AppState {
    pub fn new(
        binder_factory: Arc<dyn BinderFactory>,
        backend_factory: Arc<dyn BackendFactory>,
        backend_identifier: String,
        version: String,
        listener_addresses: Vec<String>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            registry: Registry::new(),
            binder_cache: fsd_mount::BinderCache::new(),
            backend_cache: fsd_mount::BackendClientCache::new(),
            binder_factory,
            backend_factory,
            backend_identifier,
            version,
            listener_addresses,
            shutdown,
            last_activity_unix_ms: AtomicI64::new(now_unix_ms()),
        }
    }

    fn touch(&self) {
        self.last_activity_unix_ms.store(now_unix_ms(), Ordering::Relaxed);
    }

    /// Milliseconds since the last RPC call was served.
    pub fn idle_for_ms(&self) -> i64 {
        now_unix_ms() - self.last_activity_unix_ms.load(Ordering::Relaxed)
    }

    /// The daemon is busy — and must not auto-exit — while it has active
    /// mounts, regardless of how long since the last request.
    pub fn is_busy(&self) -> bool {
        !self.registry.is_empty()
    }
}

fn now_unix_ms() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as i64).unwrap_or(0)
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new().route("/rpc", post(handle_rpc)).with_state(state)
}

async fn handle_rpc(State(state): State<Arc<AppState>>, Json(request): Json<Request>) -> Json<Response> {
    state.touch();
    Json(dispatch(&state, request))
}

fn dispatch(state: &AppState, request: Request) -> Response {
    match request {
        Request::Hello => {
            Response::Hello { version: state.version.clone(), addresses: state.listener_addresses.clone() }
        }
        Request::Ping => Response::Pong,
        Request::Stop => {
            info!("stop requested over rpc, cancelling run context");
            state.shutdown.cancel();
            Response::Ok
        }
        Request::Mount { requests } => {
            let ctx = MountContext {
                registry: &state.registry,
                binder_cache: &state.binder_cache,
                backend_cache: &state.backend_cache,
                binder_factory: state.binder_factory.as_ref(),
                backend_factory: state.backend_factory.as_ref(),
                backend_identifier: &state.backend_identifier,
            };
            match fsd_mount::mount_batch(&ctx, &requests) {
                Ok(targets) => Response::Mounted { targets },
                Err(err) => Response::error(err.to_string()),
            }
        }
        Request::Unmount { targets, all } => {
            if all {
                let unmounted = fsd_mount::unmount_all(&state.registry);
                Response::Unmounted { unmounted, not_found: vec![] }
            } else {
                let (unmounted, not_found) = fsd_mount::unmount_targets(&state.registry, &targets);
                Response::Unmounted { unmounted, not_found }
            }
        }
        Request::List => {
            let mounts = state
                .registry
                .list()
                .into_iter()
                .map(|m| MountEntry {
                    target: m.target,
                    host_api: m.host_api.to_string(),
                    fs_id: m.fs_id.to_string(),
                })
                .collect();
            Response::Mounts { mounts }
        }
    }
}

/// Half of the overall 30-second stop budget: once `shutdown` fires, each
/// listener gets this long to drain in-flight requests before it's forced
/// to return regardless (spec.md §4.2's graceful-shutdown contract).
const GRACEFUL_SHUTDOWN_GRACE: std::time::Duration = std::time::Duration::from_secs(15);

/// Serve `/rpc` on every listener in `listeners` until `shutdown` fires.
pub async fn serve(
    listeners: ListenerSet,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let app = build_router(state);
    let mut tasks = JoinSet::new();

    for bound in listeners.into_inner() {
        let shutdown = shutdown.clone();
        match bound {
            BoundListener::Tcp { listener, address } => {
                let app = app.clone();
                tasks.spawn(async move {
                    info!(%address, "serving rpc over tcp");
                    let serve = axum::serve(listener, app).with_graceful_shutdown(shutdown.cancelled_owned());
                    serve_with_grace(serve, &shutdown, &address, GRACEFUL_SHUTDOWN_GRACE).await
                });
            }
            BoundListener::Unix { listener, address, .. } => {
                let app = app.clone();
                tasks.spawn(async move {
                    info!(%address, "serving rpc over unix socket");
                    let serve = axum::serve(listener, app).with_graceful_shutdown(shutdown.cancelled_owned());
                    serve_with_grace(serve, &shutdown, &address, GRACEFUL_SHUTDOWN_GRACE).await
                });
            }
        }
    }

    // Every listener runs to completion rather than aborting the others
    // on first failure, and their errors are folded into one returned
    // error — the same accumulate-then-fold policy the stop contract
    // applies to the run-error channel (spec.md §4.2/§4.2's "Propagation
    // policy").
    let mut errors = Vec::new();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(error = %err, "listener task returned an error");
                errors.push(err.to_string());
            }
            Err(join_err) => {
                error!(error = %join_err, "listener task panicked");
                errors.push(join_err.to_string());
            }
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(std::io::Error::other(errors.join("; ")))
    }
}

/// Run `serve` (an axum graceful-shutdown future) to completion, but once
/// `shutdown` fires, force a return after `grace` regardless of whether
/// in-flight requests have drained. A forced return past the grace
/// period is logged, not treated as an error — only a genuine I/O error
/// from `serve` itself is.
async fn serve_with_grace(
    serve: impl std::future::Future<Output = std::io::Result<()>>,
    shutdown: &CancellationToken,
    address: &fsd_core::Address,
    grace: std::time::Duration,
) -> std::io::Result<()> {
    tokio::pin!(serve);
    let grace_expired = async {
        shutdown.cancelled().await;
        tokio::time::sleep(grace).await;
    };
    tokio::select! {
        result = &mut serve => result,
        _ = grace_expired => {
            warn!(%address, grace_secs = grace.as_secs(), "graceful shutdown grace period elapsed, forcing listener to stop");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsd_mount::{NullBackendFactory, NullBinderFactory};

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(
            Arc::new(NullBinderFactory),
            Arc::new(NullBackendFactory),
            "default".to_string(),
            "0.2.0".to_string(),
            vec!["/unix/run/fsd.sock".to_string()],
            CancellationToken::new(),
        ))
    }

    #[test]
    fn stop_request_cancels_the_shutdown_token() {
        let state = state();
        let resp = dispatch(&state, Request::Stop);
        assert_eq!(resp, Response::Ok);
        assert!(state.shutdown.is_cancelled());
    }

    #[test]
    fn hello_reports_the_daemon_version_and_listener_addresses() {
        let state = state();
        let resp = dispatch(&state, Request::Hello);
        assert_eq!(
            resp,
            Response::Hello {
                version: "0.2.0".to_string(),
                addresses: vec!["/unix/run/fsd.sock".to_string()],
            }
        );
    }

    #[test]
    fn ping_returns_pong() {
        let state = state();
        assert_eq!(dispatch(&state, Request::Ping), Response::Pong);
    }

    #[test]
    fn mount_then_list_then_unmount_round_trips() {
        let state = state();
        let req = fsd_core::test_support::ipfs_mount_request();
        let mounted = dispatch(&state, Request::Mount { requests: vec![req] });
        assert!(matches!(mounted, Response::Mounted { .. }));

        let listed = dispatch(&state, Request::List);
        match listed {
            Response::Mounts { mounts } => assert_eq!(mounts.len(), 1),
            other => panic!("unexpected response: {other:?}"),
        }

        let unmounted =
            dispatch(&state, Request::Unmount { targets: vec!["/mnt/ipfs".to_string()], all: false });
        assert!(matches!(
            unmounted,
            Response::Unmounted { ref unmounted, ref not_found } if unmounted.len() == 1 && not_found.is_empty()
        ));
    }

    #[test]
    fn is_busy_reflects_active_mounts() {
        let state = state();
        assert!(!state.is_busy());
        dispatch(&state, Request::Mount { requests: vec![fsd_core::test_support::ipfs_mount_request()] });
        assert!(state.is_busy());
    }

    #[tokio::test]
    async fn serve_with_grace_forces_a_return_once_the_grace_period_elapses() {
        let shutdown = CancellationToken::new();
        let address: fsd_core::Address = "/unix/tmp/fsd-grace-test.sock".parse().unwrap();

        // A "serve" future that never resolves on its own, simulating a
        // request that never drains within the grace period.
        let never_resolves = std::future::pending::<std::io::Result<()>>();

        shutdown.cancel();
        let result = serve_with_grace(
            never_resolves,
            &shutdown,
            &address,
            std::time::Duration::from_millis(5),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn serve_with_grace_returns_the_inner_result_when_it_finishes_first() {
        let shutdown = CancellationToken::new();
        let address: fsd_core::Address = "/unix/tmp/fsd-grace-test-2.sock".parse().unwrap();

        let already_done = std::future::ready(Ok(()));
        let result =
            serve_with_grace(already_done, &shutdown, &address, std::time::Duration::from_secs(15))
                .await;
        assert!(result.is_ok());
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The mount request pipeline: parse (done by the caller, via
//! `fsd_core::MountRequest`) → resolve backend → resolve binder → bind →
//! commit. A failure partway through a batch unwinds everything the
//! batch had already bound, so a `mount` call either fully succeeds or
//! leaves no trace.

use fsd_core::MountRequest;
use tracing::{info, warn};

use crate::backend::{BackendClientCache, BackendFactory};
use crate::binder::{BinderCache, BinderFactory, BinderKey};
use crate::error::MountError;
use crate::registry::Registry;

/// Everything the pipeline needs to resolve and bind a batch of requests.
pub struct MountContext<'a> {
    pub registry: &'a Registry,
    pub binder_cache: &'a BinderCache,
    pub backend_cache: &'a BackendClientCache,
    pub binder_factory: &'a dyn BinderFactory,
    pub backend_factory: &'a dyn BackendFactory,
    /// Identifies which backend instance to dial (e.g. an API address);
    /// out of scope for this crate to interpret further.
    pub backend_identifier: &'a str,
}

/// Mount every request in `requests`. Either every target ends up mounted
/// and present in the registry, or none do.
pub fn mount_batch(ctx: &MountContext<'_>, requests: &[MountRequest]) -> Result<Vec<String>, MountError> {
    let keys: Vec<String> = requests.iter().map(|r| r.target_key()).collect();
    ctx.registry.reserve_batch(&keys)?;

    let mut committed: Vec<String> = Vec::new();
    for (request, key) in requests.iter().zip(keys.iter()) {
        match bind_one(ctx, request) {
            Ok((host_api, fs_id, point)) => {
                ctx.registry.commit(key.clone(), host_api, fs_id, point);
                committed.push(key.clone());
            }
            Err(err) => {
                warn!(target = %key, error = %err, "mount failed, unwinding batch");
                let close_errors = unwind(ctx, &committed, &keys);
                return Err(if close_errors.is_empty() {
                    err
                } else {
                    MountError::BatchFailed { cause: Box::new(err), close_errors }
                });
            }
        }
    }

    info!(targets = ?keys, "mount batch committed");
    Ok(keys)
}

fn bind_one(
    ctx: &MountContext<'_>,
    request: &MountRequest,
) -> Result<(fsd_core::HostApi, fsd_core::FsId, Box<dyn crate::binder::MountPoint>), MountError> {
    let backend =
        ctx.backend_cache.get_or_connect(ctx.backend_factory, request.fs_id(), ctx.backend_identifier)?;
    let key = BinderKey {
        host_api: request.host_api(),
        fs_id: request.fs_id(),
        backend_identifier: ctx.backend_identifier.to_string(),
    };
    let binder = ctx.binder_cache.get_or_create(ctx.binder_factory, key)?;
    let point = binder.bind(request.target(), backend)?;
    Ok((request.host_api(), request.fs_id(), point))
}

/// Undo a partially-bound batch: close everything already committed, in
/// reverse mount order, then drop every reservation that never got
/// bound. Returns one formatted message per close failure, to be folded
/// into the outer error rather than discarded.
fn unwind(ctx: &MountContext<'_>, committed: &[String], all_keys: &[String]) -> Vec<String> {
    let mut close_errors = Vec::new();
    for key in committed.iter().rev() {
        if let Err(err) = ctx.registry.remove(key) {
            close_errors.push(format!("{key}: {err}"));
        }
    }
    for key in all_keys {
        if !committed.contains(key) {
            ctx.registry.release(key);
        }
    }
    close_errors
}

/// Unmount the named targets. Returns the targets actually unmounted and
/// the ones that were not found; an individual close failure is logged
/// but does not stop the rest of the batch.
pub fn unmount_targets(registry: &Registry, targets: &[String]) -> (Vec<String>, Vec<String>) {
    let mut unmounted = Vec::new();
    let mut not_found = Vec::new();
    for target in targets {
        match registry.remove(target) {
            Ok(()) => unmounted.push(target.clone()),
            Err(MountError::NotMounted(_)) => not_found.push(target.clone()),
            Err(err) => {
                warn!(target = %target, error = %err, "unmount reported an error; target forgotten anyway");
                unmounted.push(target.clone());
            }
        }
    }
    (unmounted, not_found)
}

/// Unmount every active mount.
pub fn unmount_all(registry: &Registry) -> Vec<String> {
    registry
        .remove_all()
        .into_iter()
        .map(|(target, result)| {
            if let Err(err) = result {
                warn!(target = %target, error = %err, "unmount reported an error during unmount-all");
            }
            target
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NullBackendFactory;
    use crate::binder::NullBinderFactory;
    use fsd_core::test_support::{ipfs_mount_request, pinfs_mount_request};

    fn context<'a>(
        registry: &'a Registry,
        binder_cache: &'a BinderCache,
        backend_cache: &'a BackendClientCache,
        binder_factory: &'a dyn crate::binder::BinderFactory,
        backend_factory: &'a NullBackendFactory,
    ) -> MountContext<'a> {
        MountContext {
            registry,
            binder_cache,
            backend_cache,
            binder_factory,
            backend_factory,
            backend_identifier: "default",
        }
    }

    #[test]
    fn mounts_a_batch_and_lists_it() {
        let registry = Registry::new();
        let binder_cache = BinderCache::new();
        let backend_cache = BackendClientCache::new();
        let binder_factory = NullBinderFactory;
        let backend_factory = NullBackendFactory;
        let ctx = context(&registry, &binder_cache, &backend_cache, &binder_factory, &backend_factory);

        let requests = vec![ipfs_mount_request()];
        let mounted = mount_batch(&ctx, &requests).unwrap();
        assert_eq!(mounted, vec!["/mnt/ipfs".to_string()]);
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn duplicate_in_batch_unwinds_cleanly() {
        let registry = Registry::new();
        let binder_cache = BinderCache::new();
        let backend_cache = BackendClientCache::new();
        let binder_factory = NullBinderFactory;
        let backend_factory = NullBackendFactory;
        let ctx = context(&registry, &binder_cache, &backend_cache, &binder_factory, &backend_factory);

        // First mount /mnt/ipfs for real.
        mount_batch(&ctx, &[ipfs_mount_request()]).unwrap();

        // A second batch that also targets /mnt/ipfs must fail entirely,
        // leaving the other target in the batch unmounted too.
        let second = pinfs_mount_request("/mnt/other");
        let err = mount_batch(&ctx, &[second, ipfs_mount_request()]).unwrap_err();
        assert!(matches!(err, MountError::AlreadyMounted(_)));
        assert!(!registry.contains("/mnt/other"));
        assert_eq!(registry.list().len(), 1); // only the original /mnt/ipfs survives
    }

    #[test]
    fn unmount_reports_not_found_for_unknown_targets() {
        let registry = Registry::new();
        let (unmounted, not_found) = unmount_targets(&registry, &["/mnt/nope".to_string()]);
        assert!(unmounted.is_empty());
        assert_eq!(not_found, vec!["/mnt/nope".to_string()]);
    }

    /// A binder whose bind() fails for one fixed target and whose
    /// produced mount points fail to close, for exercising the
    /// unwind-with-close-errors path.
    struct FlakyBinder {
        fails_bind_for: &'static str,
    }

    impl crate::binder::Binder for FlakyBinder {
        fn bind(
            &self,
            target: &std::path::Path,
            _backend: std::sync::Arc<dyn crate::backend::BackendClient>,
        ) -> Result<Box<dyn crate::binder::MountPoint>, MountError> {
            if target == std::path::Path::new(self.fails_bind_for) {
                return Err(MountError::BindFailed {
                    target: target.to_path_buf(),
                    reason: "simulated bind failure".to_string(),
                });
            }
            Ok(Box::new(CloseFailsMountPoint { target: target.to_path_buf() }))
        }
    }

    struct CloseFailsMountPoint {
        target: std::path::PathBuf,
    }

    impl crate::binder::MountPoint for CloseFailsMountPoint {
        fn target(&self) -> &std::path::Path {
            &self.target
        }

        fn close(&self) -> Result<(), MountError> {
            Err(MountError::UnmountFailed {
                target: self.target.clone(),
                reason: "simulated close failure".to_string(),
            })
        }
    }

    struct FlakyBinderFactory {
        fails_bind_for: &'static str,
    }

    impl crate::binder::BinderFactory for FlakyBinderFactory {
        fn create(
            &self,
            _host_api: fsd_core::HostApi,
            _fs_id: fsd_core::FsId,
            _backend_identifier: &str,
        ) -> Result<std::sync::Arc<dyn crate::binder::Binder>, MountError> {
            Ok(std::sync::Arc::new(FlakyBinder { fails_bind_for: self.fails_bind_for }))
        }
    }

    #[test]
    fn unwind_close_errors_are_appended_to_the_batch_failure() {
        let registry = Registry::new();
        let binder_cache = BinderCache::new();
        let backend_cache = BackendClientCache::new();
        let binder_factory = FlakyBinderFactory { fails_bind_for: "/mnt/b" };
        let backend_factory = NullBackendFactory;
        let ctx = context(&registry, &binder_cache, &backend_cache, &binder_factory, &backend_factory);

        let requests = vec![
            fsd_core::MountRequest::new(fsd_core::HostApi::Fuse, fsd_core::FsId::Ipfs, "/mnt/a"),
            fsd_core::MountRequest::new(fsd_core::HostApi::Fuse, fsd_core::FsId::Ipfs, "/mnt/b"),
            fsd_core::MountRequest::new(fsd_core::HostApi::Fuse, fsd_core::FsId::Ipfs, "/mnt/c"),
        ];

        let err = mount_batch(&ctx, &requests).unwrap_err();
        match err {
            MountError::BatchFailed { cause, close_errors } => {
                assert!(matches!(*cause, MountError::BindFailed { .. }));
                assert_eq!(close_errors.len(), 1);
                assert!(close_errors[0].contains("/mnt/a"));
            }
            other => panic!("expected BatchFailed, got {other:?}"),
        }

        // The whole batch left no trace in the registry, regardless of
        // the close error while unwinding /mnt/a.
        assert!(registry.is_empty());
    }

    #[test]
    fn unmount_all_clears_the_registry() {
        let registry = Registry::new();
        let binder_cache = BinderCache::new();
        let backend_cache = BackendClientCache::new();
        let binder_factory = NullBinderFactory;
        let backend_factory = NullBackendFactory;
        let ctx = context(&registry, &binder_cache, &backend_cache, &binder_factory, &backend_factory);
        mount_batch(&ctx, &[ipfs_mount_request()]).unwrap();

        let targets = unmount_all(&registry);
        assert_eq!(targets, vec!["/mnt/ipfs".to_string()]);
        assert!(registry.is_empty());
    }
}

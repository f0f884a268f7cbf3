// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binders: the host-API-specific code that actually attaches a backend
//! client to a target path (e.g. a FUSE mount). The FUSE binding
//! internals are an out-of-scope collaborator; this crate only caches
//! binders and drives them through the [`Binder`] interface.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fsd_core::{FsId, HostApi};
use parking_lot::Mutex;

use crate::backend::BackendClient;
use crate::error::MountError;

/// A live host-filesystem attachment. Dropping it does not unmount —
/// callers must call [`MountPoint::close`] explicitly so failures are
/// observable.
pub trait MountPoint: Send + Sync {
    fn target(&self) -> &Path;
    /// Detach the mount. Idempotent *in effect*: a second call must not
    /// corrupt any state, but it reports an error rather than silently
    /// succeeding again (spec invariant on `Unmount` — the registry
    /// already prevents a second call from reaching a closed mount point
    /// in normal operation, but a binder must still be safe against one).
    fn close(&self) -> Result<(), MountError>;
}

/// Binds a backend client to a target path under one host API.
pub trait Binder: Send + Sync {
    fn bind(
        &self,
        target: &Path,
        backend: Arc<dyn BackendClient>,
    ) -> Result<Box<dyn MountPoint>, MountError>;
}

/// Constructs a [`Binder`] for a given `(host_api, fs_id, backend_identifier)`
/// triple. Implemented by the daemon using the real FUSE binder; tests use
/// [`NullBinderFactory`].
pub trait BinderFactory: Send + Sync {
    fn create(
        &self,
        host_api: HostApi,
        fs_id: FsId,
        backend_identifier: &str,
    ) -> Result<Arc<dyn Binder>, MountError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinderKey {
    pub host_api: HostApi,
    pub fs_id: FsId,
    pub backend_identifier: String,
}

#[derive(Default)]
pub struct BinderCache {
    binders: Mutex<HashMap<BinderKey, Arc<dyn Binder>>>,
}

impl BinderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(
        &self,
        factory: &dyn BinderFactory,
        key: BinderKey,
    ) -> Result<Arc<dyn Binder>, MountError> {
        if let Some(existing) = self.binders.lock().get(&key) {
            return Ok(Arc::clone(existing));
        }
        let binder = factory.create(key.host_api, key.fs_id, &key.backend_identifier)?;
        Ok(Arc::clone(self.binders.lock().entry(key).or_insert(binder)))
    }
}

/// A mount point that touches no real filesystem. Reference implementation
/// for tests: a second `close()` reports `AlreadyClosed` rather than
/// succeeding again.
pub struct NullMountPoint {
    target: PathBuf,
    closed: Mutex<bool>,
}

impl NullMountPoint {
    pub fn new(target: PathBuf) -> Self {
        Self { target, closed: Mutex::new(false) }
    }
}

impl MountPoint for NullMountPoint {
    fn target(&self) -> &Path {
        &self.target
    }

    fn close(&self) -> Result<(), MountError> {
        let mut closed = self.closed.lock();
        if *closed {
            return Err(MountError::AlreadyClosed(self.target.clone()));
        }
        *closed = true;
        Ok(())
    }
}

pub struct NullBinder;

impl Binder for NullBinder {
    fn bind(
        &self,
        target: &Path,
        _backend: Arc<dyn BackendClient>,
    ) -> Result<Box<dyn MountPoint>, MountError> {
        Ok(Box::new(NullMountPoint::new(target.to_path_buf())))
    }
}

pub struct NullBinderFactory;

impl BinderFactory for NullBinderFactory {
    fn create(
        &self,
        _host_api: HostApi,
        _fs_id: FsId,
        _backend_identifier: &str,
    ) -> Result<Arc<dyn Binder>, MountError> {
        Ok(Arc::new(NullBinder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Arc<dyn BackendClient> {
        struct C;
        impl BackendClient for C {
            fn fs_id(&self) -> FsId {
                FsId::Ipfs
            }
        }
        Arc::new(C)
    }

    #[test]
    fn cache_reuses_binder_for_same_key() {
        let cache = BinderCache::new();
        let factory = NullBinderFactory;
        let key = BinderKey { host_api: HostApi::Fuse, fs_id: FsId::Ipfs, backend_identifier: "a".into() };
        let a = cache.get_or_create(&factory, key.clone()).unwrap();
        let b = cache.get_or_create(&factory, key).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn null_mount_point_second_close_is_an_error() {
        let binder = NullBinder;
        let mp = binder.bind(Path::new("/mnt/x"), client()).unwrap();
        mp.close().unwrap();
        assert!(matches!(mp.close(), Err(MountError::AlreadyClosed(_))));
    }
}

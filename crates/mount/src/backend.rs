// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend clients: connections to the content-addressed store an fs-ID
//! names (IPFS/IPNS/PinFS). The concrete client implementation — the API
//! this module's `BackendClient` trait fronts — is an out-of-scope
//! collaborator; this crate only caches and hands out whatever a
//! [`BackendFactory`] constructs.

use std::collections::HashMap;
use std::sync::Arc;

use fsd_core::FsId;
use parking_lot::Mutex;

use crate::error::MountError;

/// A live connection to one backend store.
pub trait BackendClient: Send + Sync {
    fn fs_id(&self) -> FsId;
}

/// Constructs a [`BackendClient`] for a given fs-ID and backend identifier
/// (e.g. an API endpoint or repo path). Implemented by the daemon using
/// the real store client; tests use [`NullBackendFactory`].
pub trait BackendFactory: Send + Sync {
    fn connect(&self, fs_id: FsId, backend_identifier: &str) -> Result<Arc<dyn BackendClient>, MountError>;
}

/// Connections are cached by `backend_identifier` alone, so two requests
/// naming the same upstream store reuse one client even when they ask
/// for different fs-IDs (e.g. `/fuse/ipfs/...` and `/fuse/ipns/...`
/// against the same node both resolve to one cached connection).
#[derive(Default)]
pub struct BackendClientCache {
    clients: Mutex<HashMap<String, Arc<dyn BackendClient>>>,
}

impl BackendClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_connect(
        &self,
        factory: &dyn BackendFactory,
        fs_id: FsId,
        backend_identifier: &str,
    ) -> Result<Arc<dyn BackendClient>, MountError> {
        if let Some(existing) = self.clients.lock().get(backend_identifier) {
            return Ok(Arc::clone(existing));
        }
        let client = factory.connect(fs_id, backend_identifier)?;
        Ok(Arc::clone(self.clients.lock().entry(backend_identifier.to_string()).or_insert(client)))
    }
}

/// A backend client that does nothing: reference implementation for tests
/// and for any fs-ID whose real backend isn't wired up yet.
pub struct NullBackendClient(FsId);

impl BackendClient for NullBackendClient {
    fn fs_id(&self) -> FsId {
        self.0
    }
}

pub struct NullBackendFactory;

impl BackendFactory for NullBackendFactory {
    fn connect(&self, fs_id: FsId, _backend_identifier: &str) -> Result<Arc<dyn BackendClient>, MountError> {
        Ok(Arc::new(NullBackendClient(fs_id)))
    }
}

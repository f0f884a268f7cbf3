// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binds every configured listener address before the daemon announces
//! readiness. Binding is atomic across the whole set: if any address
//! fails to bind, every listener already bound in this call is torn down
//! and the failure is reported, rather than running with a partial set
//! of listeners the caller never asked for.

use std::path::PathBuf;

use fsd_core::Address;
use thiserror::Error;
use tokio::net::{TcpListener, UnixListener};
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("address {0} has no dialable transport")]
    NotDialable(Address),
    #[error("failed to bind {address}: {source}")]
    Bind { address: Address, #[source] source: std::io::Error },
}

/// One bound listener, tagged with the address it was bound from.
pub enum BoundListener {
    Tcp { address: Address, listener: TcpListener },
    Unix { address: Address, path: PathBuf, listener: UnixListener },
}

impl BoundListener {
    pub fn address(&self) -> &Address {
        match self {
            BoundListener::Tcp { address, .. } => address,
            BoundListener::Unix { address, .. } => address,
        }
    }
}

impl Drop for BoundListener {
    fn drop(&mut self) {
        if let BoundListener::Unix { path, .. } = self {
            if let Err(err) = std::fs::remove_file(path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %err, "failed to unlink socket on shutdown");
                }
            }
        }
    }
}

/// Every listener the daemon currently exposes.
#[derive(Default)]
pub struct ListenerSet {
    listeners: Vec<BoundListener>,
}

impl ListenerSet {
    /// Bind every address, unwinding on the first failure.
    pub async fn bind_all(addresses: &[Address]) -> Result<Self, ListenerError> {
        let mut listeners = Vec::with_capacity(addresses.len());
        for address in addresses {
            match bind_one(address).await {
                Ok(listener) => listeners.push(listener),
                Err(err) => {
                    // Listeners drop here, unlinking any unix sockets already bound.
                    return Err(err);
                }
            }
        }
        Ok(Self { listeners })
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundListener> {
        self.listeners.iter()
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.listeners.iter().map(|l| l.address().clone()).collect()
    }

    pub fn into_inner(self) -> Vec<BoundListener> {
        self.listeners
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

async fn bind_one(address: &Address) -> Result<BoundListener, ListenerError> {
    let (scheme, target) =
        address.dial_args().map_err(|_| ListenerError::NotDialable(address.clone()))?;
    match scheme {
        "tcp" => {
            let listener = TcpListener::bind(&target)
                .await
                .map_err(|source| ListenerError::Bind { address: address.clone(), source })?;
            info!(%address, "bound tcp listener");
            Ok(BoundListener::Tcp { address: address.clone(), listener })
        }
        "unix" => {
            let path = PathBuf::from(&target);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|source| ListenerError::Bind { address: address.clone(), source })?;
            }
            if path.exists() {
                std::fs::remove_file(&path)
                    .map_err(|source| ListenerError::Bind { address: address.clone(), source })?;
            }
            let listener = UnixListener::bind(&path)
                .map_err(|source| ListenerError::Bind { address: address.clone(), source })?;
            info!(%address, "bound unix listener");
            Ok(BoundListener::Unix { address: address.clone(), path, listener })
        }
        _ => Err(ListenerError::NotDialable(address.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_a_unix_socket_and_unlinks_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fsd.sock");
        let address = Address::unix(path.clone());

        let set = ListenerSet::bind_all(&[address]).await.unwrap();
        assert!(path.exists());
        drop(set);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn unwinds_already_bound_listeners_on_partial_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good_path = dir.path().join("good.sock");
        let bad = Address::from_components(vec![fsd_core::Component::FsId(fsd_core::FsId::Ipfs)]);

        let err = ListenerSet::bind_all(&[Address::unix(good_path.clone()), bad]).await.unwrap_err();
        assert!(matches!(err, ListenerError::NotDialable(_)));
        assert!(!good_path.exists(), "first listener should have been unwound");
    }
}

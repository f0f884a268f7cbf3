// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use std::path::PathBuf;

use crate::address::{Address, FsId, HostApi};
use crate::request::MountRequest;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core domain types.
pub mod strategies {
    use super::*;
    use proptest::prelude::*;

    pub fn arb_host_api() -> impl Strategy<Value = HostApi> {
        Just(HostApi::Fuse)
    }

    pub fn arb_fs_id() -> impl Strategy<Value = FsId> {
        prop_oneof![Just(FsId::Ipfs), Just(FsId::Ipns), Just(FsId::PinFs)]
    }

    /// A plausible absolute mount target, e.g. `/mnt/t3`.
    pub fn arb_target_path() -> impl Strategy<Value = PathBuf> {
        "[a-z0-9]{1,8}".prop_map(|name| PathBuf::from(format!("/mnt/{name}")))
    }

    pub fn arb_mount_request() -> impl Strategy<Value = MountRequest> {
        (arb_host_api(), arb_fs_id(), arb_target_path())
            .prop_map(|(host_api, fs_id, target)| MountRequest::new(host_api, fs_id, target))
    }
}

// ── Factory functions ────────────────────────────────────────────────────

/// A well-formed IPFS mount request at `/mnt/ipfs`.
pub fn ipfs_mount_request() -> MountRequest {
    MountRequest::new(HostApi::Fuse, FsId::Ipfs, "/mnt/ipfs")
}

/// A well-formed IPNS mount request at `/mnt/ipns`.
pub fn ipns_mount_request() -> MountRequest {
    MountRequest::new(HostApi::Fuse, FsId::Ipns, "/mnt/ipns")
}

/// A well-formed PinFS mount request at the given target.
pub fn pinfs_mount_request(target: impl Into<PathBuf>) -> MountRequest {
    MountRequest::new(HostApi::Fuse, FsId::PinFs, target)
}

/// A Unix-socket address rooted at a scratch directory, suitable for tests
/// that need a real (but unique) filesystem path.
pub fn unix_address_in(dir: &std::path::Path, name: &str) -> Address {
    Address::unix(dir.join(format!("{name}.sock")))
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The mount registry: the single source of truth for which targets are
//! currently mounted.
//!
//! Inserting a batch is two-phase (reserve, then commit/release) so the
//! pipeline can bind each request's real mount point *after* knowing the
//! whole batch's targets are free, without holding the registry lock
//! across the (potentially slow) bind calls, and without losing track of
//! a bound mount point if a later request in the batch fails.

use std::collections::HashMap;

use fsd_core::{FsId, HostApi};
use parking_lot::Mutex;

use crate::binder::MountPoint;
use crate::error::MountError;

/// A read-only snapshot of one active mount, for `list` responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSnapshot {
    pub target: String,
    pub host_api: HostApi,
    pub fs_id: FsId,
}

enum Slot {
    Reserved,
    Bound { point: Box<dyn MountPoint>, host_api: HostApi, fs_id: FsId },
}

/// Concurrency-safe `Target -> MountPoint` map.
///
/// Mounting a target that is already active (or reserved by an in-flight
/// batch) is rejected rather than silently replacing it — an idempotent
/// re-mount would either leak the superseded binder or risk unmounting a
/// filesystem a caller still depends on.
#[derive(Default)]
pub struct Registry {
    mounts: Mutex<HashMap<String, Slot>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve every key in `keys` atomically: either all are free and
    /// become reserved, or none are touched and the first conflicting key
    /// is reported.
    pub fn reserve_batch(&self, keys: &[String]) -> Result<(), MountError> {
        let mut guard = self.mounts.lock();
        for key in keys {
            if guard.contains_key(key) {
                return Err(MountError::AlreadyMounted(key.into()));
            }
        }
        for key in keys {
            guard.insert(key.clone(), Slot::Reserved);
        }
        Ok(())
    }

    /// Replace a reservation with its bound mount point.
    pub fn commit(&self, key: String, host_api: HostApi, fs_id: FsId, point: Box<dyn MountPoint>) {
        self.mounts.lock().insert(key, Slot::Bound { point, host_api, fs_id });
    }

    /// Drop a reservation that never got bound (a later request in the
    /// same batch failed).
    pub fn release(&self, key: &str) {
        self.mounts.lock().remove(key);
    }

    /// Remove and close one target. Returns `NotMounted` if absent or
    /// still only reserved.
    pub fn remove(&self, target_key: &str) -> Result<(), MountError> {
        let slot = self.mounts.lock().remove(target_key);
        match slot {
            Some(Slot::Bound { point, .. }) => point.close(),
            Some(Slot::Reserved) | None => Err(MountError::NotMounted(target_key.into())),
        }
    }

    /// Remove and close every active mount, continuing past individual
    /// close failures so one stuck mount doesn't block the rest.
    pub fn remove_all(&self) -> Vec<(String, Result<(), MountError>)> {
        let entries: Vec<(String, Slot)> = self.mounts.lock().drain().collect();
        entries
            .into_iter()
            .filter_map(|(key, slot)| match slot {
                Slot::Bound { point, .. } => Some((key, point.close())),
                Slot::Reserved => None,
            })
            .collect()
    }

    pub fn contains(&self, target_key: &str) -> bool {
        self.mounts.lock().contains_key(target_key)
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.lock().is_empty()
    }

    /// A point-in-time snapshot of active (bound) mounts, sorted by
    /// target for stable display. Reserved-but-not-yet-bound entries are
    /// omitted: they aren't a committed mount yet.
    pub fn list(&self) -> Vec<MountSnapshot> {
        let mut snapshot: Vec<MountSnapshot> = self
            .mounts
            .lock()
            .iter()
            .filter_map(|(key, slot)| match slot {
                Slot::Bound { host_api, fs_id, .. } => {
                    Some(MountSnapshot { target: key.clone(), host_api: *host_api, fs_id: *fs_id })
                }
                Slot::Reserved => None,
            })
            .collect();
        snapshot.sort_by(|a, b| a.target.cmp(&b.target));
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::NullMountPoint;
    use std::path::PathBuf;

    fn point(target: &str) -> Box<dyn MountPoint> {
        Box::new(NullMountPoint::new(PathBuf::from(target)))
    }

    #[test]
    fn duplicate_target_rejects_whole_reservation() {
        let registry = Registry::new();
        registry.reserve_batch(&["/mnt/a".to_string()]).unwrap();
        registry.commit("/mnt/a".to_string(), HostApi::Fuse, FsId::Ipfs, point("/mnt/a"));

        let err = registry.reserve_batch(&["/mnt/b".to_string(), "/mnt/a".to_string()]).unwrap_err();
        assert!(matches!(err, MountError::AlreadyMounted(_)));
        // the batch was rejected atomically: /mnt/b must not have been reserved
        assert!(!registry.contains("/mnt/b"));
    }

    #[test]
    fn release_drops_an_unbound_reservation() {
        let registry = Registry::new();
        registry.reserve_batch(&["/mnt/a".to_string()]).unwrap();
        registry.release("/mnt/a");
        assert!(!registry.contains("/mnt/a"));
    }

    #[test]
    fn remove_closes_and_forgets_the_mount() {
        let registry = Registry::new();
        registry.reserve_batch(&["/mnt/a".to_string()]).unwrap();
        registry.commit("/mnt/a".to_string(), HostApi::Fuse, FsId::Ipfs, point("/mnt/a"));
        registry.remove("/mnt/a").unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_missing_target_is_an_error() {
        let registry = Registry::new();
        assert!(matches!(registry.remove("/mnt/nope"), Err(MountError::NotMounted(_))));
    }

    #[test]
    fn list_omits_reserved_and_is_sorted_by_target() {
        let registry = Registry::new();
        registry.reserve_batch(&["/mnt/z".to_string(), "/mnt/a".to_string()]).unwrap();
        registry.commit("/mnt/z".to_string(), HostApi::Fuse, FsId::Ipfs, point("/mnt/z"));
        // /mnt/a stays reserved, never committed
        let snapshot = registry.list();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].target, "/mnt/z");
    }
}

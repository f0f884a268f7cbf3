// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `MountRequest`: a validated [`Address`] naming a host-API, fs-ID, and
//! target path.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::{Address, FsId, HostApi};
use crate::error::RequestError;

/// An immutable, validated request to mount one logical filesystem at one
/// host path.
///
/// Constructed either by parsing a fully-qualified address string (e.g.
/// `/fuse/ipfs/path/mnt/ipfs`, as produced by `mount`'s positional
/// arguments once defaults/flags have been folded in) or directly via
/// [`MountRequest::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MountRequest {
    address: Address,
    host_api: HostApi,
    fs_id: FsId,
    target: PathBuf,
}

impl MountRequest {
    /// Build a request directly, without going through string parsing.
    pub fn new(host_api: HostApi, fs_id: FsId, target: impl Into<PathBuf>) -> Self {
        let target = target.into();
        let address = Address::from_components(vec![
            crate::address::Component::HostApi(host_api),
            crate::address::Component::FsId(fs_id),
            crate::address::Component::Path(target.clone()),
        ]);
        Self { address, host_api, fs_id, target }
    }

    /// Parse and validate a request address.
    ///
    /// A valid request has a recognized host-API tag, a recognized fs-ID
    /// tag, and a well-formed target path.
    pub fn parse(s: &str) -> Result<Self, RequestError> {
        let address: Address = s.parse()?;
        Self::from_address(address)
    }

    fn from_address(address: Address) -> Result<Self, RequestError> {
        let host_api = address.host_api().ok_or(RequestError::MissingHostApi)?;
        let fs_id = address.fs_id().ok_or(RequestError::MissingFsId)?;
        let target = address.mount_path().ok_or(RequestError::MissingPath)?.to_path_buf();
        Ok(Self { address, host_api, fs_id, target })
    }

    pub fn host_api(&self) -> HostApi {
        self.host_api
    }

    pub fn fs_id(&self) -> FsId {
        self.fs_id
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The key under which this request's eventual `MountPoint` is indexed
    /// in the registry: the target's string form.
    pub fn target_key(&self) -> String {
        self.target.display().to_string()
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl FromStr for MountRequest {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_request() {
        let req = MountRequest::parse("/fuse/ipfs/path/mnt/ipfs").unwrap();
        assert_eq!(req.host_api(), HostApi::Fuse);
        assert_eq!(req.fs_id(), FsId::Ipfs);
        assert_eq!(req.target(), Path::new("/mnt/ipfs"));
        assert_eq!(req.target_key(), "/mnt/ipfs");
    }

    #[test]
    fn rejects_missing_fs_id() {
        let err = MountRequest::parse("/fuse/path/mnt/ipfs").unwrap_err();
        assert_eq!(err, RequestError::MissingFsId);
    }

    #[test]
    fn rejects_missing_path() {
        let err = MountRequest::parse("/fuse/ipfs").unwrap_err();
        assert_eq!(err, RequestError::MissingPath);
    }

    #[test]
    fn new_round_trips_via_address() {
        let req = MountRequest::new(HostApi::Fuse, FsId::Ipns, "/mnt/ipns");
        let reparsed = MountRequest::from_address(req.address().clone()).unwrap();
        assert_eq!(req, reparsed);
    }
}

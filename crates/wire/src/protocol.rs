// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The request/response pair carried over the single internal `POST /rpc`
//! endpoint — a minimal stand-in needed to dispatch `mount`, `unmount`,
//! and `list`, rather than a general-purpose RPC framework.

use fsd_core::MountRequest;
use serde::{Deserialize, Serialize};

/// Request from CLI to daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Version handshake, sent once per connection before anything else.
    Hello,
    /// Liveness probe.
    Ping,
    /// Ask a live, interactively running daemon to shut itself down.
    /// `service stop` against a daemon not installed as a platform
    /// service falls back to this rather than the OS service manager.
    Stop,
    /// Mount every request in the batch. Either all succeed or none do.
    Mount { requests: Vec<MountRequest> },
    /// Unmount the named targets, or every active mount if `all`.
    Unmount {
        #[serde(default)]
        targets: Vec<String>,
        #[serde(default)]
        all: bool,
    },
    /// List active mounts.
    List,
}

/// One row in a [`Response::Mounts`] listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MountEntry {
    pub target: String,
    pub host_api: String,
    pub fs_id: String,
}

/// Response from daemon to CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Version handshake response. `addresses` lists every listener the
    /// daemon is currently serving RPC on, for `service status`.
    Hello { version: String, addresses: Vec<String> },
    /// Health check response.
    Pong,
    /// Generic success.
    Ok,
    /// Error response.
    Error { message: String },
    /// Mount batch committed; lists the targets now mounted.
    Mounted { targets: Vec<String> },
    /// Unmount result.
    Unmounted {
        unmounted: Vec<String>,
        not_found: Vec<String>,
    },
    /// Active-mount listing.
    Mounts { mounts: Vec<MountEntry> },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error { message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_response_round_trips_through_json() {
        let resp = Response::Hello { version: "0.2.0".to_string(), addresses: vec!["/unix/run/fsd.sock".to_string()] };
        let json = serde_json::to_string(&resp).unwrap();
        let back: Response = serde_json::from_str(&json).unwrap();
        assert_eq!(resp, back);
    }

    #[test]
    fn request_mount_round_trips_through_json() {
        let req = Request::Mount { requests: vec![] };
        let json = serde_json::to_string(&req).unwrap();
        let back: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }

    #[test]
    fn unmount_defaults_are_empty_and_not_all() {
        let json = r#"{"type":"Unmount"}"#;
        let req: Request = serde_json::from_str(json).unwrap();
        assert_eq!(req, Request::Unmount { targets: vec![], all: false });
    }

    #[test]
    fn error_response_helper_sets_message() {
        let resp = Response::error("bind failed");
        assert!(resp.is_error());
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ServiceStatus`: the record stream a spawned daemon writes to its own
//! stdout during the startup handshake.

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// One record in the `Starting` / `Ready` / `Error` handshake stream.
///
/// Ordering invariant: exactly one `Starting` first; zero or more
/// `Ready`-with-address; terminated by a final `Ready { addr: None }`
/// sentinel or an `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServiceStatus {
    /// The daemon process has begun startup.
    Starting,
    /// A listener is bound (carries its address), or startup is complete
    /// (no address — the final sentinel).
    Ready {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        addr: Option<Address>,
    },
    /// Startup failed; `reason` is free-form.
    Error { reason: String },
}

impl ServiceStatus {
    pub fn ready_with(addr: Address) -> Self {
        ServiceStatus::Ready { addr: Some(addr) }
    }

    pub fn ready_sentinel() -> Self {
        ServiceStatus::Ready { addr: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_one_json_object_per_line() {
        let starting = serde_json::to_string(&ServiceStatus::Starting).unwrap();
        assert_eq!(starting, r#"{"status":"starting"}"#);

        let addr: Address = "/unix/tmp/fsd.sock".parse().unwrap();
        let ready = serde_json::to_string(&ServiceStatus::ready_with(addr.clone())).unwrap();
        let back: ServiceStatus = serde_json::from_str(&ready).unwrap();
        assert_eq!(back, ServiceStatus::ready_with(addr));

        let sentinel = serde_json::to_string(&ServiceStatus::ready_sentinel()).unwrap();
        let back: ServiceStatus = serde_json::from_str(&sentinel).unwrap();
        assert_eq!(back, ServiceStatus::ready_sentinel());
    }

    #[test]
    fn error_record_carries_reason() {
        let err = ServiceStatus::Error { reason: "bind failed".to_string() };
        let s = serde_json::to_string(&err).unwrap();
        let back: ServiceStatus = serde_json::from_str(&s).unwrap();
        assert_eq!(back, err);
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal XDG-style path lookups.
//!
//! This module provides just enough of the XDG interface (user-level
//! runtime/state/config lookup, plus a fixed system-level fallback) for
//! default listener addresses, rather than a full XDG implementation.

use std::path::PathBuf;

use crate::address::Address;

/// `$XDG_RUNTIME_DIR` (or platform equivalent via the `dirs` crate).
pub fn user_runtime_dir() -> Option<PathBuf> {
    dirs::runtime_dir()
}

/// `$XDG_STATE_HOME` (or platform equivalent).
pub fn user_state_dir() -> Option<PathBuf> {
    dirs::state_dir()
}

/// `$XDG_CONFIG_HOME` (or platform equivalent).
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir()
}

/// The system-wide socket-directory root, used when no user-XDG directory
/// is available (e.g. running as a system service rather than a user
/// session). Fixed per-platform, since there is no "system XDG" standard.
#[cfg(unix)]
pub fn system_socket_root() -> PathBuf {
    PathBuf::from("/var/run")
}

#[cfg(not(unix))]
pub fn system_socket_root() -> PathBuf {
    std::env::temp_dir()
}

/// Build the default Unix socket address for `service`/`server` under the
/// most-user-specific directory available: runtime, then state, then
/// config. Building the path never fails — it may simply not exist yet;
/// only malformed *input* is a parse error, not a not-yet-created
/// default path.
pub fn user_default_socket(service: &str, server: &str) -> Option<Address> {
    let base = user_runtime_dir().or_else(user_state_dir).or_else(user_config_dir)?;
    Some(Address::unix(base.join(service).join(format!("{server}.sock"))))
}

/// The system-level counterpart of [`user_default_socket`].
pub fn system_default_socket(service: &str, server: &str) -> Address {
    Address::unix(system_socket_root().join(service).join(format!("{server}.sock")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_default_is_always_available() {
        let addr = system_default_socket("fsd", "daemon");
        assert!(addr.dial_args().is_ok());
    }
}

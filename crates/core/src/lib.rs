// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fsd-core: address parsing, mount-request modeling, and settings shared
//! by every other crate in the workspace. No I/O beyond path/env lookups.

pub mod address;
pub mod error;
pub mod request;
pub mod settings;
pub mod status;
pub mod xdg;

pub use address::{Address, Component, FsId, HostApi};
pub use error::{AddressError, ConfigError, RequestError};
pub use request::MountRequest;
pub use settings::{Settings, SettingsFlags};
pub use status::ServiceStatus;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

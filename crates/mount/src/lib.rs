// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The mount registry and request pipeline: the subsystem that turns a
//! validated [`fsd_core::MountRequest`] into a live host-filesystem
//! attachment, and keeps track of what's currently mounted.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod backend;
mod binder;
mod error;
mod pipeline;
mod registry;

pub use backend::{BackendClient, BackendClientCache, BackendFactory, NullBackendClient, NullBackendFactory};
pub use binder::{Binder, BinderCache, BinderFactory, BinderKey, MountPoint, NullBinder, NullBinderFactory, NullMountPoint};
pub use error::MountError;
pub use pipeline::{mount_batch, unmount_all, unmount_targets, MountContext};
pub use registry::{MountSnapshot, Registry};

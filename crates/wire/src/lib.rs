// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol for daemon communication: the JSON request/response pair
//! carried over HTTP, and the stdio handshake a spawned daemon performs
//! with its parent process before the HTTP side is reachable.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod handshake;
mod protocol;

pub use client::{ClientError, RpcClient};
pub use handshake::{read_handshake, write_status, Handshake, HandshakeError};
pub use protocol::{MountEntry, Request, Response};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon logging setup.
//!
//! A spawned daemon's stdout is reserved for the [`fsd_wire`] handshake
//! stream, so once the handshake completes the daemon logs to a rotating
//! file instead (the same reasoning a backgrounded process uses when its
//! stderr may be closed or redirected).

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Install a file-backed subscriber rooted at `log_dir`, rotating daily.
/// The returned guard must be kept alive for the duration of the process;
/// dropping it stops the background flush thread.
pub fn init_file_logging(log_dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "fsd-daemon.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false).with_filter(filter);

    tracing_subscriber::registry().with(file_layer).init();
    Ok(guard)
}

/// Install a stderr-backed subscriber, for interactive/foreground runs
/// where stdout is reserved for the handshake stream but stderr is free.
pub fn init_interactive_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(filter))
        .init();
}

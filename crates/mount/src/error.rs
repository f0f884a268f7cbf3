// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MountError {
    #[error("target {0:?} is already mounted")]
    AlreadyMounted(PathBuf),
    #[error("target {0:?} is not mounted")]
    NotMounted(PathBuf),
    #[error("mount point {0:?} was already closed")]
    AlreadyClosed(PathBuf),
    #[error("no binder registered for host API {host_api:?} / fs {fs_id:?}")]
    NoBinder { host_api: fsd_core::HostApi, fs_id: fsd_core::FsId },
    #[error("no backend client available for {0:?}")]
    NoBackend(fsd_core::FsId),
    #[error("bind failed for {target:?}: {reason}")]
    BindFailed { target: PathBuf, reason: String },
    #[error("unmount failed for {target:?}: {reason}")]
    UnmountFailed { target: PathBuf, reason: String },
    /// A batch mount failed and unwinding the partial batch hit its own
    /// close errors, which are appended rather than discarded (spec's
    /// propagation policy: close errors during error handling are
    /// appended, not replaced).
    #[error("{cause} (and {} close error(s) while unwinding the batch: {})", close_errors.len(), close_errors.join("; "))]
    BatchFailed { cause: Box<MountError>, close_errors: Vec<String> },
}

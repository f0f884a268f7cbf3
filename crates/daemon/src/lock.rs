// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A filesystem-level exclusive lock guarding against two daemon
//! processes racing to bind the same default socket from the same host.
//!
//! The in-process [`crate::lifecycle::Lifecycle`] state machine only
//! protects Start/Stop ordering within one process; a second `fsd
//! service run` invocation against the same state directory is a
//! separate process and needs an OS-level lock instead.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("another daemon instance already holds the lock at {0}")]
    AlreadyLocked(std::path::PathBuf),
    #[error("could not open or lock {path}: {source}")]
    Io { path: std::path::PathBuf, #[source] source: std::io::Error },
}

/// Holds the daemon's exclusive instance lock for as long as it's alive;
/// the lock is released automatically when this is dropped (process
/// exit or explicit drop during Stop).
pub struct InstanceLock {
    _file: File,
}

impl InstanceLock {
    /// Acquire the lock at `path`, creating its parent directory and the
    /// file itself if needed. Fails immediately (non-blocking) rather
    /// than waiting for a prior instance to exit.
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;
        }
        // Avoid truncating before the lock is held: a losing process must
        // not blank out the winning daemon's pid.
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                file.set_len(0).map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;
                writeln!(file, "{}", std::process::id())
                    .map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;
                Ok(Self { _file: file })
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                Err(LockError::AlreadyLocked(path.to_path_buf()))
            }
            Err(source) => Err(LockError::Io { path: path.to_path_buf(), source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_on_the_same_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daemon.pid");

        let first = InstanceLock::acquire(&path).unwrap();
        let err = InstanceLock::acquire(&path).unwrap_err();
        assert!(matches!(err, LockError::AlreadyLocked(_)));

        drop(first);
        InstanceLock::acquire(&path).unwrap();
    }
}

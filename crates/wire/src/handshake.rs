// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The stdio handshake a spawned daemon performs with its parent (spec
//! §4.1.2, §8): one [`ServiceStatus`] JSON object per line on stdout,
//! ending in a `Ready` (carrying the bound address, or `None` as a
//! completion sentinel) or an `Error`.

use std::time::Duration;

use fsd_core::{Address, ServiceStatus};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("daemon did not complete its handshake within the startup deadline")]
    Timeout,
    #[error("expected {expected} as the first handshake record, got {got:?}")]
    OutOfOrder { expected: &'static str, got: ServiceStatus },
    #[error("daemon closed stdout before signaling readiness")]
    Eof,
    #[error("daemon reported a startup error: {0}")]
    Reported(String),
    #[error("I/O error during handshake: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed handshake record: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Write one handshake record as a line of JSON, flushing immediately so
/// the parent observes it without buffering delay.
pub async fn write_status(
    writer: &mut (impl AsyncWrite + Unpin),
    status: &ServiceStatus,
) -> std::io::Result<()> {
    let mut line = serde_json::to_string(status)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}

/// Outcome of a successful handshake: either a dialable address, or the
/// no-address sentinel meaning the daemon started but exposes nothing to
/// dial directly (e.g. it bound only addresses the caller already knew).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handshake {
    Ready(Address),
    ReadySentinel,
}

/// Read the handshake stream to completion, or until `deadline` elapses.
///
/// Ordering invariant: the first record must be `Starting`. Any number of
/// `Ready { addr: Some(_) }` records may follow, each naming one bound
/// listener. The stream ends with either `Ready { addr: None }` (the
/// success sentinel) or `Error`.
pub async fn read_handshake(
    reader: impl AsyncBufRead + Unpin,
    deadline: Duration,
) -> Result<Vec<Handshake>, HandshakeError> {
    tokio::time::timeout(deadline, read_handshake_inner(reader))
        .await
        .map_err(|_| HandshakeError::Timeout)?
}

async fn read_handshake_inner(
    mut reader: impl AsyncBufRead + Unpin,
) -> Result<Vec<Handshake>, HandshakeError> {
    let mut line = String::new();
    let mut ready = Vec::new();
    let mut saw_starting = false;

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            // EOF after at least one address is treated as success (the
            // daemon started and simply closed stdout without an
            // explicit sentinel); EOF with zero addresses and no
            // terminator is abrupt and an error, same as EOF before
            // `Starting`.
            return if saw_starting && !ready.is_empty() { Ok(ready) } else { Err(HandshakeError::Eof) };
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let status: ServiceStatus = serde_json::from_str(trimmed)?;

        if !saw_starting {
            match status {
                ServiceStatus::Starting => {
                    saw_starting = true;
                    continue;
                }
                other => return Err(HandshakeError::OutOfOrder { expected: "starting", got: other }),
            }
        }

        match status {
            ServiceStatus::Starting => {
                return Err(HandshakeError::OutOfOrder { expected: "ready or error", got: status })
            }
            ServiceStatus::Ready { addr: Some(addr) } => ready.push(Handshake::Ready(addr)),
            ServiceStatus::Ready { addr: None } => {
                ready.push(Handshake::ReadySentinel);
                return Ok(ready);
            }
            ServiceStatus::Error { reason } => return Err(HandshakeError::Reported(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn lines(records: &[ServiceStatus]) -> Cursor<Vec<u8>> {
        let mut buf = Vec::new();
        for r in records {
            buf.extend_from_slice(serde_json::to_string(r).unwrap().as_bytes());
            buf.push(b'\n');
        }
        Cursor::new(buf)
    }

    #[tokio::test]
    async fn full_handshake_yields_ready_addresses_then_sentinel() {
        let addr: Address = "/unix/tmp/fsd.sock".parse().unwrap();
        let records = vec![
            ServiceStatus::Starting,
            ServiceStatus::ready_with(addr.clone()),
            ServiceStatus::ready_sentinel(),
        ];
        let got = read_handshake(lines(&records), Duration::from_secs(1)).await.unwrap();
        assert_eq!(got, vec![Handshake::Ready(addr), Handshake::ReadySentinel]);
    }

    #[tokio::test]
    async fn error_record_short_circuits() {
        let records = vec![ServiceStatus::Starting, ServiceStatus::Error { reason: "boom".into() }];
        let err = read_handshake(lines(&records), Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, HandshakeError::Reported(reason) if reason == "boom"));
    }

    #[tokio::test]
    async fn missing_starting_record_is_out_of_order() {
        let records = vec![ServiceStatus::ready_sentinel()];
        let err = read_handshake(lines(&records), Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, HandshakeError::OutOfOrder { .. }));
    }

    #[tokio::test]
    async fn eof_right_after_starting_with_no_address_is_an_error() {
        // Abrupt EOF with zero addresses and no explicit terminator is
        // an error, not a success sentinel.
        let records = vec![ServiceStatus::Starting];
        let err = read_handshake(lines(&records), Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, HandshakeError::Eof));
    }

    #[tokio::test]
    async fn eof_after_an_address_is_success() {
        // EOF after at least one address terminates the handshake
        // successfully without an explicit `Ready{addr: None}` sentinel.
        let addr: Address = "/unix/tmp/fsd.sock".parse().unwrap();
        let records = vec![ServiceStatus::Starting, ServiceStatus::ready_with(addr.clone())];
        let got = read_handshake(lines(&records), Duration::from_secs(1)).await.unwrap();
        assert_eq!(got, vec![Handshake::Ready(addr)]);
    }

    #[tokio::test]
    async fn eof_before_starting_is_an_error() {
        let err = read_handshake(lines(&[]), Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, HandshakeError::Eof));
    }

    #[tokio::test]
    async fn times_out_when_no_output_arrives() {
        let pending = tokio::io::BufReader::new(tokio::io::empty());
        let err = read_handshake(pending, Duration::from_millis(10)).await.unwrap_err();
        assert!(matches!(err, HandshakeError::Timeout));
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP-RPC client: dials a daemon [`Address`] and exchanges one
//! [`Request`]/[`Response`] pair per call against the daemon's `/rpc`
//! endpoint.
//!
//! Unix-socket dialing uses a synthetic host name and a custom connector
//! (`hyperlocal`), the same pattern Docker's API client uses to speak
//! HTTP over `/var/run/docker.sock`.

use std::path::PathBuf;

use bytes::Bytes;
use fsd_core::Address;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use crate::protocol::{Request, Response};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("address {0} has no dialable transport")]
    NotDialable(String),
    #[error("could not reach daemon: {0}")]
    Connect(#[from] hyper_util::client::legacy::Error),
    #[error("daemon response body error: {0}")]
    Body(#[from] hyper::Error),
    #[error("malformed request or response payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed request URI: {0}")]
    Uri(#[from] http::uri::InvalidUri),
    #[error("malformed HTTP request: {0}")]
    Build(#[from] http::Error),
    #[error("daemon returned HTTP {0}")]
    Status(http::StatusCode),
}

/// A connected RPC client. One instance dials exactly one transport.
pub enum RpcClient {
    #[cfg(unix)]
    Unix { client: Client<hyperlocal::UnixConnector, Full<Bytes>>, socket_path: PathBuf },
    Tcp { client: Client<HttpConnector, Full<Bytes>>, authority: String },
}

impl RpcClient {
    /// Build a client for `address` without making any network calls.
    pub fn dial(address: &Address) -> Result<Self, ClientError> {
        let (scheme, target) =
            address.dial_args().map_err(|_| ClientError::NotDialable(address.to_string()))?;
        match scheme {
            #[cfg(unix)]
            "unix" => {
                let client = Client::builder(TokioExecutor::new()).build(hyperlocal::UnixConnector);
                Ok(RpcClient::Unix { client, socket_path: PathBuf::from(target) })
            }
            "tcp" => {
                let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
                Ok(RpcClient::Tcp { client, authority: target })
            }
            _ => Err(ClientError::NotDialable(address.to_string())),
        }
    }

    /// Send one request, returning the decoded response.
    pub async fn call(&self, request: &Request) -> Result<Response, ClientError> {
        let body = Full::new(Bytes::from(serde_json::to_vec(request)?));
        let http_response = match self {
            #[cfg(unix)]
            RpcClient::Unix { client, socket_path } => {
                let uri: hyper::Uri = hyperlocal::Uri::new(socket_path, "/rpc").into();
                let req = http::Request::builder()
                    .method(http::Method::POST)
                    .uri(uri)
                    .header(http::header::CONTENT_TYPE, "application/json")
                    .body(body)?;
                client.request(req).await?
            }
            RpcClient::Tcp { client, authority } => {
                let uri: hyper::Uri = format!("http://{authority}/rpc").parse()?;
                let req = http::Request::builder()
                    .method(http::Method::POST)
                    .uri(uri)
                    .header(http::header::CONTENT_TYPE, "application/json")
                    .body(body)?;
                client.request(req).await?
            }
        };

        if !http_response.status().is_success() {
            return Err(ClientError::Status(http_response.status()));
        }
        let bytes = http_response.into_body().collect().await?.to_bytes();
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// True if a live daemon answers `Ping` with `Pong` at `address`.
    pub async fn probe(address: &Address) -> bool {
        match Self::dial(address) {
            Ok(client) => matches!(client.call(&Request::Ping).await, Ok(Response::Pong)),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dial_rejects_non_dialable_address() {
        let addr: Address = "/fuse/ipfs/path/mnt/ipfs".parse().unwrap();
        let err = RpcClient::dial(&addr).unwrap_err();
        assert!(matches!(err, ClientError::NotDialable(_)));
    }

    #[tokio::test]
    async fn probe_is_false_when_nothing_is_listening() {
        let dir = tempfile::tempdir().unwrap();
        let addr = Address::unix(dir.path().join("nobody-home.sock"));
        assert!(!RpcClient::probe(&addr).await);
    }
}

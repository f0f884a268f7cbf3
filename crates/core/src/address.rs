// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Address`: an opaque, byte-parseable network/mount locator.
//!
//! Grammar is a small multiaddr-like slash-delimited sequence of tagged
//! components, e.g. `/ip4/127.0.0.1/tcp/5005`, `/unix/run/fsd/daemon.sock`,
//! or `/fuse/ipfs/path/mnt/ipfs`. This is a deliberately narrow stand-in for
//! a full address-format library rather than a general-purpose one.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// The host integration layer a mount targets (e.g. FUSE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostApi {
    Fuse,
}

impl HostApi {
    fn tag(self) -> &'static str {
        match self {
            HostApi::Fuse => "fuse",
        }
    }

    fn parse_tag(tag: &str) -> Option<Self> {
        match tag {
            "fuse" => Some(HostApi::Fuse),
            _ => None,
        }
    }
}

impl fmt::Display for HostApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Default for HostApi {
    fn default() -> Self {
        HostApi::Fuse
    }
}

/// The logical filesystem a mount exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FsId {
    Ipfs,
    Ipns,
    PinFs,
}

impl FsId {
    fn tag(self) -> &'static str {
        match self {
            FsId::Ipfs => "ipfs",
            FsId::Ipns => "ipns",
            FsId::PinFs => "pinfs",
        }
    }

    fn parse_tag(tag: &str) -> Option<Self> {
        match tag {
            "ipfs" => Some(FsId::Ipfs),
            "ipns" => Some(FsId::Ipns),
            "pinfs" => Some(FsId::PinFs),
            _ => None,
        }
    }
}

impl fmt::Display for FsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Default for FsId {
    fn default() -> Self {
        FsId::Ipfs
    }
}

/// One tagged segment of an [`Address`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    Ip4(Ipv4Addr),
    Ip6(Ipv6Addr),
    Dns(String),
    Tcp(u16),
    Unix(PathBuf),
    HostApi(HostApi),
    FsId(FsId),
    Path(PathBuf),
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Ip4(a) => write!(f, "/ip4/{a}"),
            Component::Ip6(a) => write!(f, "/ip6/{a}"),
            Component::Dns(d) => write!(f, "/dns/{d}"),
            Component::Tcp(p) => write!(f, "/tcp/{p}"),
            Component::Unix(p) => write!(f, "/unix{}", p.display()),
            Component::HostApi(h) => write!(f, "/{h}"),
            Component::FsId(id) => write!(f, "/{id}"),
            Component::Path(p) => write!(f, "/path{}", p.display()),
        }
    }
}

/// An opaque, self-describing locator.
///
/// Used uniformly to name RPC listeners, backend services, and mount
/// targets. Equality and string form are stable; values are cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(Vec<Component>);

impl Address {
    /// Construct directly from already-validated components.
    pub fn from_components(components: Vec<Component>) -> Self {
        Self(components)
    }

    /// A TCP dial address.
    pub fn tcp(host: std::net::IpAddr, port: u16) -> Self {
        let ip_component = match host {
            std::net::IpAddr::V4(v4) => Component::Ip4(v4),
            std::net::IpAddr::V6(v6) => Component::Ip6(v6),
        };
        Self(vec![ip_component, Component::Tcp(port)])
    }

    /// A Unix-domain dial address.
    pub fn unix(path: impl Into<PathBuf>) -> Self {
        Self(vec![Component::Unix(path.into())])
    }

    /// Iterate over this address's protocol components.
    pub fn iter_components(&self) -> impl Iterator<Item = &Component> {
        self.0.iter()
    }

    /// Project this address to a (network, host) dial pair, for use with a
    /// generic stream-dialing API.
    ///
    /// - TCP addresses yield `("tcp", "<ip>:<port>")`.
    /// - Unix addresses yield `("unix", "<path>")`.
    pub fn dial_args(&self) -> Result<(&'static str, String), AddressError> {
        let mut ip: Option<String> = None;
        let mut port: Option<u16> = None;
        for c in &self.0 {
            match c {
                Component::Unix(p) => return Ok(("unix", p.display().to_string())),
                Component::Ip4(a) => ip = Some(a.to_string()),
                Component::Ip6(a) => ip = Some(a.to_string()),
                Component::Dns(d) => ip = Some(d.clone()),
                Component::Tcp(p) => port = Some(*p),
                _ => {}
            }
        }
        match (ip, port) {
            (Some(host), Some(port)) => Ok(("tcp", format!("{host}:{port}"))),
            _ => Err(AddressError::NotDialable),
        }
    }

    /// The `HostApi` component, if present.
    pub fn host_api(&self) -> Option<HostApi> {
        self.0.iter().find_map(|c| match c {
            Component::HostApi(h) => Some(*h),
            _ => None,
        })
    }

    /// The `FsId` component, if present.
    pub fn fs_id(&self) -> Option<FsId> {
        self.0.iter().find_map(|c| match c {
            Component::FsId(id) => Some(*id),
            _ => None,
        })
    }

    /// The mount-target `Path` component, if present.
    pub fn mount_path(&self) -> Option<&std::path::Path> {
        self.0.iter().find_map(|c| match c {
            Component::Path(p) => Some(p.as_path()),
            _ => None,
        })
    }

    /// Whether the underlying Unix socket path (if any) currently exists on
    /// disk and, where the platform reports file modes, is a socket.
    ///
    /// Used by the executor's liveness probe rather than as a
    /// general-purpose predicate.
    #[cfg(unix)]
    pub fn unix_path(&self) -> Option<&std::path::Path> {
        self.0.iter().find_map(|c| match c {
            Component::Unix(p) => Some(p.as_path()),
            _ => None,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.0 {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse a slash-delimited address string into its tagged components.
///
/// `unix` and `path` components consume the remainder of the string
/// (including embedded slashes) as a single path value; every other
/// component consumes exactly one following segment.
fn parse(s: &str) -> Result<Address, AddressError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(AddressError::Empty);
    }
    let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let segments: Vec<&str> = body.split('/').collect();
    if segments.is_empty() || segments[0].is_empty() {
        return Err(AddressError::Empty);
    }

    let mut components = Vec::new();
    let mut i = 0;
    while i < segments.len() {
        let tag = segments[i];
        match tag {
            "ip4" => {
                let value = segments
                    .get(i + 1)
                    .ok_or(AddressError::MissingValue { tag: "ip4" })?;
                let addr: Ipv4Addr = value.parse().map_err(|e: std::net::AddrParseError| {
                    AddressError::InvalidValue {
                        tag: "ip4",
                        value: (*value).to_string(),
                        reason: e.to_string(),
                    }
                })?;
                components.push(Component::Ip4(addr));
                i += 2;
            }
            "ip6" => {
                let value = segments
                    .get(i + 1)
                    .ok_or(AddressError::MissingValue { tag: "ip6" })?;
                let addr: Ipv6Addr = value.parse().map_err(|e: std::net::AddrParseError| {
                    AddressError::InvalidValue {
                        tag: "ip6",
                        value: (*value).to_string(),
                        reason: e.to_string(),
                    }
                })?;
                components.push(Component::Ip6(addr));
                i += 2;
            }
            "dns" => {
                let value = segments
                    .get(i + 1)
                    .ok_or(AddressError::MissingValue { tag: "dns" })?;
                components.push(Component::Dns((*value).to_string()));
                i += 2;
            }
            "tcp" => {
                let value = segments
                    .get(i + 1)
                    .ok_or(AddressError::MissingValue { tag: "tcp" })?;
                let port: u16 = value.parse().map_err(|e: std::num::ParseIntError| {
                    AddressError::InvalidValue {
                        tag: "tcp",
                        value: (*value).to_string(),
                        reason: e.to_string(),
                    }
                })?;
                components.push(Component::Tcp(port));
                i += 2;
            }
            "unix" => {
                let rest = segments[i + 1..].join("/");
                if rest.is_empty() {
                    return Err(AddressError::MissingValue { tag: "unix" });
                }
                components.push(Component::Unix(PathBuf::from(format!("/{rest}"))));
                break;
            }
            "path" => {
                let rest = segments[i + 1..].join("/");
                if rest.is_empty() {
                    return Err(AddressError::MissingValue { tag: "path" });
                }
                components.push(Component::Path(PathBuf::from(format!("/{rest}"))));
                break;
            }
            other => {
                if let Some(host_api) = HostApi::parse_tag(other) {
                    components.push(Component::HostApi(host_api));
                    i += 1;
                } else if let Some(fs_id) = FsId::parse_tag(other) {
                    components.push(Component::FsId(fs_id));
                    i += 1;
                } else {
                    return Err(AddressError::UnknownComponent(other.to_string()));
                }
            }
        }
    }

    Ok(Address(components))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tcp_address() {
        let addr: Address = "/ip4/127.0.0.1/tcp/5005".parse().unwrap();
        assert_eq!(addr.dial_args().unwrap(), ("tcp", "127.0.0.1:5005".to_string()));
    }

    #[test]
    fn parses_unix_address() {
        let addr: Address = "/unix/run/fsd/daemon.sock".parse().unwrap();
        assert_eq!(addr.dial_args().unwrap(), ("unix", "/run/fsd/daemon.sock".to_string()));
    }

    #[test]
    fn parses_mount_request_address() {
        let addr: Address = "/fuse/ipfs/path/mnt/ipfs".parse().unwrap();
        assert_eq!(addr.host_api(), Some(HostApi::Fuse));
        assert_eq!(addr.fs_id(), Some(FsId::Ipfs));
        assert_eq!(addr.mount_path(), Some(std::path::Path::new("/mnt/ipfs")));
    }

    #[test]
    fn round_trips_through_display() {
        let addr: Address = "/fuse/ipns/path/mnt/ipns".parse().unwrap();
        let reparsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(addr, reparsed);
    }

    #[test]
    fn rejects_unknown_component() {
        let err = "/bogus/thing".parse::<Address>().unwrap_err();
        assert_eq!(err, AddressError::UnknownComponent("bogus".to_string()));
    }

    #[test]
    fn rejects_empty_address() {
        assert_eq!("".parse::<Address>().unwrap_err(), AddressError::Empty);
        assert_eq!("/".parse::<Address>().unwrap_err(), AddressError::Empty);
    }

    #[test]
    fn tcp_address_missing_port_is_not_dialable() {
        let addr: Address = "/ip4/127.0.0.1".parse().unwrap();
        assert_eq!(addr.dial_args().unwrap_err(), AddressError::NotDialable);
    }
}

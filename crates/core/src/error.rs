// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors parsing an [`Address`](crate::Address) from its string form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("empty address")]
    Empty,

    #[error("unrecognized address component {0:?}")]
    UnknownComponent(String),

    #[error("component {tag} expected a value but none followed")]
    MissingValue { tag: &'static str },

    #[error("could not parse {tag} value {value:?}: {reason}")]
    InvalidValue { tag: &'static str, value: String, reason: String },

    #[error("address has no network component (expected ip4/ip6/dns + tcp, or unix)")]
    NotDialable,
}

/// Errors validating a [`MountRequest`](crate::MountRequest) once its
/// address has parsed successfully.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("mount request is missing a host-API component (e.g. /fuse)")]
    MissingHostApi,

    #[error("mount request is missing an fs-ID component (e.g. /ipfs)")]
    MissingFsId,

    #[error("mount request is missing a target path component (e.g. /path/<dir>)")]
    MissingPath,
}

/// Errors surfaced while parsing [`Settings`](crate::Settings) from CLI
/// flags, environment variables, or on-disk config.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("could not determine a state/config directory for this platform")]
    NoStateDir,

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue { key: &'static str, value: String, reason: String },
}

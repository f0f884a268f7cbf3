// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed settings, merged from CLI flags and environment variables.
//!
//! Each setting gets its own explicit merge step below rather than a
//! reflection-driven walk over the struct's fields.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::address::{Address, FsId, HostApi};
use crate::error::ConfigError;

/// Env var prefix for every setting's derived key.
const ENV_PREFIX: &str = "FSD";

/// Raw values as collected from `clap`, before merging with the
/// environment. `None` means "the flag was not passed".
#[derive(Debug, Clone, Default)]
pub struct SettingsFlags {
    pub addresses: Option<Vec<String>>,
    pub auto_exit: Option<String>,
    pub host_api: Option<String>,
    pub fs_id: Option<String>,
    pub ipfs: Option<String>,
    pub all: bool,
}

/// Platform service-manager descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOptions {
    pub username: Option<String>,
    pub password: Option<String>,
    pub delayed_autostart: bool,
}

/// Fully merged settings for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// User-supplied candidate daemon addresses, in priority order.
    pub addresses: Vec<Address>,
    /// Idle-watchdog period; `None` disables auto-exit.
    pub auto_exit: Option<Duration>,
    pub host_api: Option<HostApi>,
    pub fs_id: Option<FsId>,
    pub ipfs_address: Option<Address>,
    pub all: bool,
    pub service: ServiceOptions,
}

impl Settings {
    /// Merge CLI flags with environment variables. Precedence: CLI >
    /// environment > defaults. Each field has its own merge step; none
    /// use reflection.
    pub fn merge(flags: SettingsFlags) -> Result<Self, ConfigError> {
        let addresses = merge_addresses(flags.addresses)?;
        let auto_exit = merge_duration(flags.auto_exit, &["FSD_AUTO_EXIT", "FSD_STOP_AFTER"])?;
        let host_api = merge_enum(flags.host_api, &["FSD_SYSTEM", "FSD_HOST_API"], |s| {
            match s {
                "fuse" => Ok(HostApi::Fuse),
                other => Err(other.to_string()),
            }
        })?;
        let fs_id = merge_enum(flags.fs_id, &["FSD_FS", "FSD_FS_ID"], |s| match s {
            "ipfs" => Ok(FsId::Ipfs),
            "ipns" => Ok(FsId::Ipns),
            "pinfs" => Ok(FsId::PinFs),
            other => Err(other.to_string()),
        })?;
        let ipfs_address = merge_address(flags.ipfs, &["FSD_IPFS"])?;
        let all = flags.all || env_bool(&["FSD_ALL"]);
        let service = merge_service_options()?;

        Ok(Self { addresses, auto_exit, host_api, fs_id, ipfs_address, all, service })
    }
}

fn env_lookup(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| std::env::var(k).ok()).filter(|v| !v.is_empty())
}

fn env_bool(keys: &[&str]) -> bool {
    env_lookup(keys).map(|v| matches!(v.as_str(), "1" | "true" | "yes")).unwrap_or(false)
}

fn merge_addresses(cli: Option<Vec<String>>) -> Result<Vec<Address>, ConfigError> {
    let raw: Vec<String> = match cli {
        Some(v) if !v.is_empty() => v,
        _ => match env_lookup(&["FSD_SERVICE_ADDRESS", "FSD_API"]) {
            Some(csv) => csv.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
            None => Vec::new(),
        },
    };
    raw.iter()
        .map(|s| {
            s.parse::<Address>().map_err(|e| ConfigError::InvalidValue {
                key: "service-address",
                value: s.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

fn merge_address(cli: Option<String>, keys: &[&str]) -> Result<Option<Address>, ConfigError> {
    let raw = cli.or_else(|| env_lookup(keys));
    match raw {
        Some(s) => s
            .parse::<Address>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue { key: "ipfs", value: s, reason: e.to_string() }),
        None => Ok(None),
    }
}

/// Parse a Go-duration-style string: a sequence of `<number><unit>` pairs
/// (`h`, `m`, `s`, `ms`), e.g. `"1m30s"`, `"500ms"`, `"30s"`.
fn merge_duration(cli: Option<String>, keys: &[&str]) -> Result<Option<Duration>, ConfigError> {
    let raw = cli.or_else(|| env_lookup(keys));
    match raw {
        Some(s) => parse_go_duration(&s)
            .map(Some)
            .map_err(|reason| ConfigError::InvalidValue { key: "auto-exit", value: s, reason }),
        None => Ok(None),
    }
}

fn merge_enum<T>(
    cli: Option<String>,
    keys: &[&str],
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<T>, ConfigError> {
    let raw = cli.or_else(|| env_lookup(keys));
    match raw {
        Some(s) => parse(&s)
            .map(Some)
            .map_err(|reason| ConfigError::InvalidValue { key: "enum", value: s, reason }),
        None => Ok(None),
    }
}

fn merge_service_options() -> Result<ServiceOptions, ConfigError> {
    Ok(ServiceOptions {
        username: env_lookup(&["FSD_SERVICE_USERNAME"]),
        password: env_lookup(&["FSD_SERVICE_PASSWORD"]),
        delayed_autostart: env_bool(&["FSD_SERVICE_DELAYED_AUTOSTART"]),
    })
}

fn parse_go_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    let mut total = Duration::ZERO;
    let mut chars = s.char_indices().peekable();
    let mut start = 0;
    while let Some(&(idx, c)) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            chars.next();
            continue;
        }
        // `idx` is the start of the unit suffix; consume it.
        let number = &s[start..idx];
        if number.is_empty() {
            return Err(format!("missing number before unit in {s:?}"));
        }
        let unit_start = idx;
        while let Some(&(_, c)) = chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                break;
            }
            chars.next();
        }
        let unit_end = chars.peek().map(|(i, _)| *i).unwrap_or(s.len());
        let unit = &s[unit_start..unit_end];
        let value: f64 = number.parse().map_err(|_| format!("invalid number {number:?}"))?;
        let unit_secs = match unit {
            "ms" => 0.001,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            other => return Err(format!("unknown duration unit {other:?}")),
        };
        total += Duration::from_secs_f64(value * unit_secs);
        start = unit_end;
    }
    if start != s.len() {
        return Err(format!("trailing characters in duration {s:?}"));
    }
    Ok(total)
}

/// The derived environment-variable key for a setting name:
/// `<ENV_PREFIX>_<UPPER_SNAKE_CASE_NAME>`.
pub fn derived_env_key(setting_name: &str) -> String {
    format!("{ENV_PREFIX}_{}", setting_name.to_uppercase().replace('-', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_overrides_environment() {
        std::env::set_var("FSD_AUTO_EXIT_TEST_UNUSED", "1"); // no-op, avoids unused import warning in min test harnesses
        let got = merge_duration(Some("5s".to_string()), &["FSD_AUTO_EXIT"]).unwrap();
        assert_eq!(got, Some(Duration::from_secs(5)));
    }

    #[test]
    fn parses_compound_duration() {
        assert_eq!(parse_go_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_go_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_go_duration("2h").unwrap(), Duration::from_secs(7200));
    }

    #[test]
    fn rejects_malformed_duration() {
        assert!(parse_go_duration("5x").is_err());
        assert!(parse_go_duration("").is_err());
    }

    #[test]
    fn derived_env_key_is_prefixed_upper_snake() {
        assert_eq!(derived_env_key("auto-exit"), "FSD_AUTO_EXIT");
    }

    #[test]
    fn merge_addresses_parses_csv_from_env() {
        std::env::remove_var("FSD_SERVICE_ADDRESS");
        std::env::set_var("FSD_SERVICE_ADDRESS", "/unix/tmp/a.sock,/unix/tmp/b.sock");
        let got = merge_addresses(None).unwrap();
        assert_eq!(got.len(), 2);
        std::env::remove_var("FSD_SERVICE_ADDRESS");
    }
}

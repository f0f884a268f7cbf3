// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations.

pub mod list;
pub mod mount;
pub mod service;
pub mod unmount;

use fsd_core::{Settings, SettingsFlags};

/// Merge an `--address` repetition (plus any flag set by a specific
/// subcommand) into [`Settings`], applying the env-var fallbacks.
pub fn merge_settings(flags: SettingsFlags) -> anyhow::Result<Settings> {
    Settings::merge(flags).map_err(|e| anyhow::anyhow!("{e}"))
}

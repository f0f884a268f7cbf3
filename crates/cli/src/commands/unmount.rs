// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use fsd_core::SettingsFlags;
use fsd_wire::{Request, Response};

use crate::cli::UnmountArgs;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

pub async fn run(args: UnmountArgs, format: OutputFormat) -> anyhow::Result<()> {
    check_args(args.all, &args.targets)?;

    let flags = SettingsFlags {
        addresses: (!args.addresses.is_empty()).then_some(args.addresses),
        ..Default::default()
    };
    let settings = super::merge_settings(flags)?;

    let client = crate::executor::connect_or_spawn(&settings).await?;
    let request = Request::Unmount { targets: args.targets, all: args.all };
    match client.call(&request).await? {
        Response::Unmounted { unmounted, not_found } => {
            let obj = serde_json::json!({ "unmounted": &unmounted, "not_found": &not_found });
            format_or_json(format, &obj, || {
                for target in &unmounted {
                    println!("Unmounted {}", crate::color::header(target));
                }
                for target in &not_found {
                    eprintln!("Not mounted: {target}");
                }
            })?;
            if !not_found.is_empty() {
                return Err(ExitError::new(
                    1,
                    format!("{} target(s) were not mounted: {}", not_found.len(), not_found.join(", ")),
                )
                .into());
            }
            Ok(())
        }
        Response::Error { message } => anyhow::bail!(message),
        other => anyhow::bail!("unexpected daemon response: {other:?}"),
    }
}

/// Pre-run validation: `--all` and explicit targets are mutually
/// exclusive, and at least one of them must be given. Runs before any
/// daemon connection is attempted, so a rejected request has no
/// side effects at all.
fn check_args(all: bool, targets: &[String]) -> anyhow::Result<()> {
    if all && !targets.is_empty() {
        anyhow::bail!("ambiguous request: --all cannot be combined with explicit targets");
    }
    if !all && targets.is_empty() {
        anyhow::bail!("at least one target is required (or pass --all)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_with_explicit_targets_is_ambiguous() {
        let err = check_args(true, &["/mnt/ipfs".to_string()]).unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn neither_all_nor_targets_is_rejected() {
        assert!(check_args(false, &[]).is_err());
    }

    #[test]
    fn all_with_no_targets_is_accepted() {
        assert!(check_args(true, &[]).is_ok());
    }

    #[test]
    fn explicit_targets_without_all_is_accepted() {
        assert!(check_args(false, &["/mnt/ipfs".to_string()]).is_ok());
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use fsd_core::{FsId, HostApi, MountRequest, SettingsFlags};
use fsd_wire::{Request, Response};

use crate::cli::MountArgs;
use crate::output::{format_or_json, OutputFormat};

pub async fn run(args: MountArgs, format: OutputFormat) -> anyhow::Result<()> {
    let flags = SettingsFlags {
        addresses: (!args.addresses.is_empty()).then_some(args.addresses),
        host_api: args.host_api,
        fs_id: args.fs_id,
        ipfs: args.ipfs,
        ..Default::default()
    };
    let settings = super::merge_settings(flags)?;

    let host_api = settings.host_api.unwrap_or_default();
    let fs_id = settings.fs_id.unwrap_or(FsId::Ipfs);
    let requests: Vec<MountRequest> =
        args.targets.iter().map(|t| MountRequest::new(host_api, fs_id, t.clone())).collect();

    let client = crate::executor::connect_or_spawn(&settings).await?;
    match client.call(&Request::Mount { requests }).await? {
        Response::Mounted { targets } => format_or_json(format, &targets, || {
            for target in &targets {
                println!(
                    "Mounted {} {}",
                    crate::color::header(target),
                    crate::color::muted(&format!("({})", host_label(host_api, fs_id)))
                );
            }
        }),
        Response::Error { message } => anyhow::bail!(message),
        other => anyhow::bail!("unexpected daemon response: {other:?}"),
    }
}

fn host_label(host_api: HostApi, fs_id: FsId) -> String {
    format!("{host_api}/{fs_id}")
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use fsd_core::SettingsFlags;
use fsd_wire::{MountEntry, Request, Response};

use crate::output::{handle_list, OutputFormat};
use crate::table::{Column, Table};

pub async fn run(format: OutputFormat) -> anyhow::Result<()> {
    let settings = super::merge_settings(SettingsFlags::default())?;
    let client = crate::executor::connect_or_spawn(&settings).await?;

    match client.call(&Request::List).await? {
        Response::Mounts { mounts } => handle_list(format, &mounts, "No active mounts.", render),
        Response::Error { message } => anyhow::bail!(message),
        other => anyhow::bail!("unexpected daemon response: {other:?}"),
    }
}

fn render(mounts: &[MountEntry], out: &mut dyn std::io::Write) {
    let mut table = Table::new(vec![Column::new("TARGET"), Column::new("SYSTEM"), Column::new("FS")]);
    for mount in mounts {
        table.row(vec![mount.target.clone(), mount.host_api.clone(), mount.fs_id.clone()]);
    }
    table.render(out);
}

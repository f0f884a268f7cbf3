// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fsd`: mount content-addressed stores as host filesystems, commanding
//! a single background daemon over a localhost transport.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod cli;
mod color;
mod commands;
mod exit_error;
mod executor;
mod output;
mod table;

use clap::Parser;
use cli::{Cli, Commands};
use exit_error::ExitError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !is_daemon_run(&cli.command) {
        fsd_daemon::logging::init_interactive_logging();
    }

    if let Err(err) = dispatch(cli).await {
        if let Some(exit_err) = err.downcast_ref::<ExitError>() {
            eprintln!("{}", exit_err.message);
            std::process::exit(exit_err.code);
        }
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn is_daemon_run(command: &Commands) -> bool {
    matches!(command, Commands::Service(s) if matches!(s.command, cli::ServiceCommand::Run { .. }))
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Mount(args) => commands::mount::run(args, cli.output).await,
        Commands::Unmount(args) => commands::unmount::run(args, cli.output).await,
        Commands::List => commands::list::run(cli.output).await,
        Commands::Service(args) => commands::service::run(args.command, cli.output).await,
    }
}

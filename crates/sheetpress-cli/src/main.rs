// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sheetpress — spreadsheet rows to a paginated PDF.
//
// Entry point. Initialises logging, opens the session (data directory, saved
// layout, configuration) and dispatches the subcommand.

mod cli;
mod config_cmd;
mod export_cmd;
mod inspect_cmd;
mod layout_cmd;
mod session;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use session::Session;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(?cli, "arguments parsed");

    let data_dir = cli.data_dir;
    match &cli.command {
        Commands::Export(args) => export_cmd::run(&Session::open(data_dir)?, args),
        Commands::Layout(command) => layout_cmd::run(&Session::open(data_dir)?, command),
        Commands::Config(command) => config_cmd::run(&mut Session::open(data_dir)?, command),
        Commands::Inspect { file } => inspect_cmd::run(file),
    }
}

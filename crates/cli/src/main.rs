// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! evboard - inspect, convert and exercise event logs

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod names;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{convert, show, simulate};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "evboard",
    version,
    about = "Event board - record, inspect and convert event logs"
)]
struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the events of a stored log
    Show(show::ShowArgs),
    /// Rewrite a stored log in another format or version
    Convert(convert::ConvertArgs),
    /// Run a broker with synthetic senders and record what a listener receives
    Simulate(simulate::SimulateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = setup_logging(cli.log_file.as_deref())?;

    match cli.command {
        Commands::Show(args) => show::show(args),
        Commands::Convert(args) => convert::convert(args),
        Commands::Simulate(args) => simulate::simulate(args).await,
    }
}

fn setup_logging(
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let Some(log_file) = log_file else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
        return Ok(None);
    };

    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let name = log_file
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("invalid log file: {}", log_file.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(Some(guard))
}

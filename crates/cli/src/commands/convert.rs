// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Convert command

use anyhow::Result;
use clap::Args;
use evboard_storage::{EventReader, EventSink, SinkFormat, SinkVersion};
use std::path::PathBuf;

#[derive(Args)]
pub struct ConvertArgs {
    /// Stored event log to read
    pub input: PathBuf,
    /// Where to write the converted log
    pub output: PathBuf,
    /// ascii or binary
    #[arg(long, default_value = "binary")]
    pub format: SinkFormat,
    /// Record layout version to write
    #[arg(
        long,
        default_value_t = SinkVersion::DEFAULT.as_u16(),
        value_parser = clap::value_parser!(u16).range(1..=2)
    )]
    pub format_version: u16,
}

pub fn convert(args: ConvertArgs) -> Result<()> {
    let reader = EventReader::open(&args.input)?;
    let from = (reader.format(), reader.version());
    let mut events = reader.read_all()?;

    let version = SinkVersion::from_u16(args.format_version)?;
    let mut sink = EventSink::open(&args.output, args.format, version)?;
    sink.write_view(&mut events)?;
    let count = sink.close()?;

    println!(
        "converted {} events ({} {} -> {} {})",
        count, from.0, from.1, args.format, version
    );
    Ok(())
}

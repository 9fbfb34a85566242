// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Show command

use crate::names;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use evboard_core::{EventFilter, EventSource, FilterCriteria, StateFilter, StringTable};
use evboard_storage::EventReader;
use std::path::PathBuf;

#[derive(Args)]
pub struct ShowArgs {
    /// Stored event log (ascii or binary)
    pub file: PathBuf,
    /// Name table written by `simulate --names`
    #[arg(long)]
    pub names: Option<PathBuf>,
    /// Only events from this sender, by name or id (repeatable)
    #[arg(long = "sender")]
    pub senders: Vec<String>,
    /// Only events of this type, by name or id (repeatable)
    #[arg(long = "event")]
    pub events: Vec<String>,
    /// all, completed, continued, zerodur or nonzerodur
    #[arg(long, default_value = "all")]
    pub state: StateFilter,
    /// Only events at most this many ms before the reference time (0 = no limit)
    #[arg(long, default_value_t = 0)]
    pub span: u64,
    /// Reference time for --span, defaults to the latest event time
    #[arg(long)]
    pub at: Option<u64>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

pub fn show(args: ShowArgs) -> Result<()> {
    let table = match &args.names {
        Some(path) => names::load(path)?,
        None => StringTable::new(),
    };
    let criteria = criteria(&args, &table)?;

    let mut events = EventReader::open(&args.file)?.read_all()?;
    let reference_time = match args.at {
        Some(at) => at,
        None => latest_time(&mut events),
    };

    let mut filter = EventFilter::new(events, criteria);
    filter.set_reference_time(reference_time);

    let stdout = std::io::stdout();
    output::print_events(&mut filter, &table, args.output, &mut stdout.lock())?;
    Ok(())
}

fn criteria(args: &ShowArgs, table: &StringTable) -> Result<FilterCriteria> {
    let sender_ids = args
        .senders
        .iter()
        .map(|name| names::resolve(table, name))
        .collect::<Result<Vec<_>>>()?;
    let event_ids = args
        .events
        .iter()
        .map(|name| names::resolve(table, name))
        .collect::<Result<Vec<_>>>()?;

    Ok(FilterCriteria::any()
        .senders(sender_ids)
        .events(event_ids)
        .within(args.span)
        .state(args.state))
}

fn latest_time(events: &mut dyn EventSource) -> u64 {
    events.reset();
    let mut latest = 0;
    while let Some(event) = events.next() {
        latest = latest.max(event.time);
    }
    events.reset();
    latest
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;

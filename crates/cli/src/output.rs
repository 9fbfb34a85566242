// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use evboard_broker::dump;
use evboard_core::{Event, EventSource, Id, Interner};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct EventRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<String>,
    #[serde(flatten)]
    fields: &'a Event,
}

/// Print every event of a view; returns the number printed
pub fn print_events(
    view: &mut dyn EventSource,
    interner: &dyn Interner,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<usize> {
    match format {
        OutputFormat::Text => Ok(dump::write_table(view, interner, out)?),
        OutputFormat::Json => {
            view.reset();
            let mut printed = 0;
            while let Some(event) = view.next() {
                let record = EventRecord {
                    sender: name(interner, event.sender_id),
                    event: name(interner, event.event_id),
                    fields: event.as_ref(),
                };
                writeln!(out, "{}", serde_json::to_string(&record)?)?;
                printed += 1;
            }
            Ok(printed)
        }
    }
}

fn name(interner: &dyn Interner, id: Id) -> Option<String> {
    interner.resolve(id).map(|name| name.to_string())
}

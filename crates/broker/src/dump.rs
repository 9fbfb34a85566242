// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable event tables for debugging

use evboard_core::{EventSource, Id, Interner, INVALID_ID};
use std::io::{self, Write};

const HEADER: &str = "#\ttype\tsender\tevent\ttime\tdur\tsize\tstate";
const RULE: &str = "----------------------------------------------------------------";

/// Write every event of `view` as one tab-separated row
///
/// Names are resolved through `interner`; ids it does not know are printed
/// as `#<id>`.
pub fn write_table(
    view: &mut dyn EventSource,
    interner: &dyn Interner,
    out: &mut dyn Write,
) -> io::Result<usize> {
    writeln!(out, "{}", HEADER)?;
    writeln!(out, "{}", RULE)?;

    view.reset();
    let mut rows = 0;
    while let Some(event) = view.next() {
        writeln!(
            out,
            "{:03}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            rows,
            event.payload.kind().name(),
            name_of(interner, event.sender_id),
            name_of(interner, event.event_id),
            event.time,
            event.dur,
            event.payload.byte_len(),
            event.state,
        )?;
        rows += 1;
    }
    Ok(rows)
}

fn name_of(interner: &dyn Interner, id: Id) -> String {
    if id == INVALID_ID {
        return String::new();
    }
    match interner.resolve(id) {
        Some(name) => name.to_string(),
        None => format!("#{}", id),
    }
}

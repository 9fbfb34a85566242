// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Name tables stored next to event logs
//!
//! Stored logs hold interned ids only. A name table is a text file with one
//! name per line; line `n` (from 0) names id `n`.

use anyhow::{Context, Result};
use evboard_core::{Id, Interner, StringTable};
use std::path::Path;

pub fn load(path: &Path) -> Result<StringTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read name table {}", path.display()))?;
    Ok(StringTable::from_names(text.lines()))
}

pub fn save(table: &StringTable, path: &Path) -> Result<()> {
    let mut text = String::new();
    for name in table.names() {
        text.push_str(&name);
        text.push('\n');
    }
    std::fs::write(path, text)
        .with_context(|| format!("failed to write name table {}", path.display()))
}

/// Resolve a command-line name or numeric id
pub fn resolve(table: &StringTable, name: &str) -> Result<Id> {
    if let Ok(id) = name.parse::<Id>() {
        return Ok(id);
    }
    table
        .lookup(name)
        .ok_or_else(|| anyhow::anyhow!("unknown name '{}' (pass --names or a numeric id)", name))
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener addresses
//!
//! An address names the senders and events a listener wants:
//!   - `"audio,video:vad,gesture"` - two senders, two events
//!   - `":vad"` - event `vad` from any sender
//!   - `"audio:"` or `"audio"` - any event from sender `audio`
//!   - `""` or `"*"` - everything
//!
//! A `*` in place of either list also means any.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

// Sender and event names - this is a constant valid pattern
#[allow(clippy::expect_used)]
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("constant regex pattern is valid"));

/// Errors that can occur when parsing an address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address '{0}' has more than one ':'")]
    TooManySeparators(String),
    #[error("address '{0}' contains an empty name")]
    EmptyName(String),
    #[error("invalid name '{name}' in address '{address}'")]
    InvalidName { address: String, name: String },
}

/// Parsed sender and event name lists; an empty list matches any
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventAddress {
    senders: Vec<String>,
    events: Vec<String>,
}

impl EventAddress {
    pub fn parse(address: &str) -> Result<Self, AddressError> {
        let mut parts = address.split(':');
        let senders = parts.next().unwrap_or_default();
        let events = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(AddressError::TooManySeparators(address.to_string()));
        }

        Ok(Self {
            senders: parse_names(address, senders)?,
            events: parse_names(address, events)?,
        })
    }

    pub fn new(senders: Vec<String>, events: Vec<String>) -> Self {
        Self { senders, events }
    }

    pub fn senders(&self) -> &[String] {
        &self.senders
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Whether the address matches every event
    pub fn is_any(&self) -> bool {
        self.senders.is_empty() && self.events.is_empty()
    }
}

fn parse_names(address: &str, list: &str) -> Result<Vec<String>, AddressError> {
    let list = list.trim();
    if list.is_empty() || list == "*" {
        return Ok(Vec::new());
    }

    list.split(',')
        .map(str::trim)
        .map(|name| {
            if name.is_empty() {
                Err(AddressError::EmptyName(address.to_string()))
            } else if !NAME_PATTERN.is_match(name) {
                Err(AddressError::InvalidName {
                    address: address.to_string(),
                    name: name.to_string(),
                })
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}

impl fmt::Display for EventAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            return f.write_str("*");
        }
        write!(f, "{}:{}", self.senders.join(","), self.events.join(","))
    }
}

impl std::str::FromStr for EventAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[path = "address_tests.rs"]
mod tests;

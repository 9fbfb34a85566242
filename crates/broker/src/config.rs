// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker configuration

use crate::error::ConfigError;
use evboard_core::DEFAULT_CHUNK_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Broker configuration, loadable from TOML
///
/// ```toml
/// name = "eboard"
/// dispatch_interval = "10ms"
/// max_listeners = 16
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    /// Label of the broker's tracing span
    pub name: String,
    /// Time between dispatch cycles of the dispatch task
    #[serde(with = "humantime_serde")]
    pub dispatch_interval: Duration,
    pub max_senders: usize,
    pub max_listeners: usize,
    /// Entries per log chunk
    pub chunk_size: usize,
    /// Call `on_events` even when a cycle has nothing for the listener
    pub notify_idle: bool,
    /// Intern unknown address names with a warning instead of rejecting them
    pub intern_unknown_names: bool,
    /// Run one last dispatch cycle when stopping
    pub flush_on_stop: bool,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            name: "eboard".to_string(),
            dispatch_interval: Duration::from_millis(10),
            max_senders: 64,
            max_listeners: 64,
            chunk_size: DEFAULT_CHUNK_SIZE,
            notify_idle: false,
            intern_unknown_names: false,
            flush_on_stop: true,
        }
    }
}

impl BrokerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_dispatch_interval(mut self, interval: Duration) -> Self {
        self.dispatch_interval = interval;
        self
    }

    pub fn with_capacity(mut self, max_senders: usize, max_listeners: usize) -> Self {
        self.max_senders = max_senders;
        self.max_listeners = max_listeners;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_notify_idle(mut self, notify_idle: bool) -> Self {
        self.notify_idle = notify_idle;
        self
    }

    pub fn with_intern_unknown_names(mut self, intern: bool) -> Self {
        self.intern_unknown_names = intern;
        self
    }

    pub fn with_flush_on_stop(mut self, flush: bool) -> Self {
        self.flush_on_stop = flush;
        self
    }

    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::from_toml(&text)
    }

    /// Load a TOML file, falling back to defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Read(path.to_path_buf(), e)),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

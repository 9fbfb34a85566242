// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the broker
//!
//! None of these are fatal: every failure leaves the broker usable and the
//! caller may retry.

use evboard_core::AddressError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when registering with or running the broker
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("malformed address: {0}")]
    MalformedAddress(#[from] AddressError),
    #[error("unresolved name '{0}' in address")]
    UnresolvedName(String),
    #[error("#{kind} exceeds available space '{limit}'")]
    CapacityExceeded { kind: &'static str, limit: usize },
    #[error("dispatch task needs a tokio runtime")]
    NoRuntime,
}

/// Errors that can occur when publishing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("sender '{0}' is not registered with this broker")]
    UnregisteredSender(String),
}

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

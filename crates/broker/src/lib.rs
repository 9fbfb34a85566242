// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! evboard-broker: routes events from senders to listeners
//!
//! Senders append to a shared log; a dispatch task periodically hands each
//! listener the new entries that pass its filter. Immediate listeners are
//! served on the publishing thread instead.

mod broker;
pub mod config;
mod dispatch;
pub mod dump;
pub mod error;
pub mod listener;
pub mod subscription;

pub use broker::EventBroker;
pub use config::BrokerConfig;
pub use dispatch::DispatchReport;
pub use error::{BrokerError, ConfigError, PublishError};
pub use listener::{Listener, NamedSender, Sender, SenderHandle};
pub use subscription::SubscriptionId;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Roles a component can play on the bus

use evboard_core::{Event, EventSource, Id, Interner};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A component that receives events from the broker
///
/// `on_events` runs synchronously on the dispatch task while the broker's
/// dispatch lock is held. Every other listener waits until it returns, so
/// implementations should return quickly or hand work off to their own
/// worker. Registering or removing listeners from inside a callback
/// deadlocks. Publishing from a callback is fine.
pub trait Listener: Send + Sync {
    /// Batched delivery of the events that arrived since the last cycle
    ///
    /// `events` is a filtered view positioned at its first entry; `count` is
    /// the number of entries it yields and `now_ms` the reference time used
    /// for the window test.
    fn on_events(&self, events: &mut dyn EventSource, count: usize, now_ms: u64);

    /// Immediate delivery, called on the publishing thread
    fn on_event(&self, _event: &Event) {}

    /// Called when the broker starts
    fn on_start(&self) {}

    /// Called when the broker stops, after the final delivery
    fn on_stop(&self) {}

    /// Name used in log messages
    fn name(&self) -> &str {
        "listener"
    }
}

/// A component that publishes events
pub trait Sender: Send + Sync {
    /// Sender name, interned as the sender id of every published event
    fn name(&self) -> &str;

    /// Called when the broker starts
    fn on_start(&self) {}

    /// Called when the broker stops
    fn on_stop(&self) {}
}

/// A sender with nothing but a name
#[derive(Debug, Clone)]
pub struct NamedSender(pub String);

impl NamedSender {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self(name.into()))
    }
}

impl Sender for NamedSender {
    fn name(&self) -> &str {
        &self.0
    }
}

/// Proof that a sender was registered with a particular broker
///
/// The sender id is interned on first publish, not at registration.
#[derive(Clone)]
pub struct SenderHandle {
    pub(crate) broker: u64,
    pub(crate) slot: usize,
    name: Arc<str>,
    id: Arc<OnceLock<Id>>,
}

impl SenderHandle {
    pub(crate) fn new(broker: u64, slot: usize, name: &str) -> Self {
        Self {
            broker,
            slot,
            name: Arc::from(name),
            id: Arc::new(OnceLock::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sender id, interning the name on first use
    pub fn sender_id(&self, interner: &dyn Interner) -> Id {
        *self.id.get_or_init(|| interner.intern(&self.name))
    }
}

impl fmt::Debug for SenderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderHandle")
            .field("name", &self.name)
            .field("slot", &self.slot)
            .finish()
    }
}

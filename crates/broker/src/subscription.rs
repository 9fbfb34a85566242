// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener subscriptions and their read cursors

use crate::listener::Listener;
use evboard_core::{
    Event, EventAddress, EventFilter, EventSource, FilterCriteria, LogView,
};
use std::fmt;
use std::sync::Arc;

/// Handle for removing a subscription
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A windowed listener registration
///
/// The cursor counts log entries already offered to the listener. It only
/// moves forward, except when the broker is cleared. A disabled
/// subscription still moves its cursor, so it skips whatever arrived while
/// it was paused.
pub struct Subscription {
    pub id: SubscriptionId,
    pub address: EventAddress,
    listener: Arc<dyn Listener>,
    filter: EventFilter<LogView>,
    cursor: usize,
    enabled: bool,
}

impl Subscription {
    pub fn new(
        id: SubscriptionId,
        address: EventAddress,
        listener: Arc<dyn Listener>,
        criteria: FilterCriteria,
    ) -> Self {
        Self {
            id,
            address,
            listener,
            filter: EventFilter::new(LogView::default(), criteria),
            cursor: 0,
            enabled: true,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        self.filter.criteria()
    }

    pub fn listener(&self) -> &Arc<dyn Listener> {
        &self.listener
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn rewind(&mut self) {
        self.cursor = 0;
        self.filter.bind(LogView::default());
    }

    /// Offer the entries `[cursor, snapshot end)` to the listener
    ///
    /// Returns the number of matching events when the listener was called,
    /// `None` when it was not. The cursor moves to the end of the snapshot
    /// either way.
    pub(crate) fn deliver(
        &mut self,
        snapshot: &LogView,
        now: u64,
        notify_idle: bool,
    ) -> Option<usize> {
        let end = snapshot.snapshot_len();
        let start = std::mem::replace(&mut self.cursor, end);
        if !self.enabled {
            return None;
        }

        self.filter.bind(snapshot.range(start, end));
        self.filter.set_reference_time(now);

        let count = self.filter.len();
        self.filter.reset();
        if count == 0 && !notify_idle {
            return None;
        }
        self.listener.on_events(&mut self.filter, count, now);
        Some(count)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("address", &self.address.to_string())
            .field("listener", &self.listener.name())
            .field("criteria", self.filter.criteria())
            .field("cursor", &self.cursor)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// A zero-latency registration, served on the publishing thread
pub(crate) struct ImmediateSubscription {
    pub id: SubscriptionId,
    pub listener: Arc<dyn Listener>,
    pub criteria: FilterCriteria,
    pub enabled: bool,
}

impl ImmediateSubscription {
    pub fn accepts(&self, event: &Event) -> bool {
        self.enabled && self.criteria.matches(event, 0, false)
    }
}

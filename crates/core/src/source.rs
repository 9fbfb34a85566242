// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cursor-based event sources
//!
//! An [`EventSource`] is a forward cursor over events. Positional access and
//! counting are defined on top of the cursor: `get(i)` rewinds and advances
//! `i + 1` times and `len()` rewinds and drains. Callers that index into a
//! filtered view pay for re-filtering from the start on every call.

use crate::event::Event;
use std::sync::Arc;

/// A forward cursor over events
pub trait EventSource {
    /// Rewind the cursor to the first entry
    fn reset(&mut self);

    /// Return the next entry and advance, or `None` at the end
    fn next(&mut self) -> Option<Arc<Event>>;

    /// Entry at `index`, as if rewound and advanced `index + 1` times
    fn get(&mut self, index: usize) -> Option<Arc<Event>> {
        self.reset();
        let mut current = None;
        for _ in 0..=index {
            current = Some(self.next()?);
        }
        current
    }

    /// Number of entries, as if rewound and drained
    ///
    /// Leaves the cursor exhausted; call [`reset`](Self::reset) before reuse.
    fn len(&mut self) -> usize {
        self.reset();
        let mut count = 0;
        while self.next().is_some() {
            count += 1;
        }
        count
    }

    fn is_empty(&mut self) -> bool {
        self.reset();
        let empty = self.next().is_none();
        self.reset();
        empty
    }

    /// Rewind and collect every remaining entry
    fn to_vec(&mut self) -> Vec<Arc<Event>> {
        self.reset();
        let mut events = Vec::new();
        while let Some(event) = self.next() {
            events.push(event);
        }
        events
    }
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn next(&mut self) -> Option<Arc<Event>> {
        (**self).next()
    }
}

impl<S: EventSource + ?Sized> EventSource for Box<S> {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn next(&mut self) -> Option<Arc<Event>> {
        (**self).next()
    }
}

/// An owned list of events with a cursor
///
/// Used for captured views and for logs read back from storage.
#[derive(Debug, Clone, Default)]
pub struct EventList {
    events: Vec<Arc<Event>>,
    cursor: usize,
}

impl EventList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: impl Into<Arc<Event>>) {
        self.events.push(event.into());
    }

    /// Capture every entry of another source
    pub fn capture(source: &mut dyn EventSource) -> Self {
        Self {
            events: source.to_vec(),
            cursor: 0,
        }
    }

    pub fn as_slice(&self) -> &[Arc<Event>] {
        &self.events
    }

    pub fn into_inner(self) -> Vec<Arc<Event>> {
        self.events
    }
}

impl From<Vec<Event>> for EventList {
    fn from(events: Vec<Event>) -> Self {
        Self {
            events: events.into_iter().map(Arc::new).collect(),
            cursor: 0,
        }
    }
}

impl From<Vec<Arc<Event>>> for EventList {
    fn from(events: Vec<Arc<Event>>) -> Self {
        Self { events, cursor: 0 }
    }
}

impl FromIterator<Event> for EventList {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

impl EventSource for EventList {
    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn next(&mut self) -> Option<Arc<Event>> {
        let event = self.events.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(event)
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Criteria-based views over event sources
//!
//! An [`EventFilter`] binds a source to a set of criteria and a reference
//! time. It owns no events: `next()` pulls from the source until an entry
//! passes, and since the filter is itself an [`EventSource`] filters can be
//! stacked or handed to anything that consumes a source.

use crate::event::{Event, EventState};
use crate::intern::Id;
use crate::source::EventSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Selects events by completion or duration class
///
/// Exactly one value is active per filter; the values do not combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    #[default]
    All,
    Completed,
    Continued,
    /// Only instantaneous events
    ZeroDur,
    /// Only events with a duration
    NonZeroDur,
}

impl StateFilter {
    pub fn accepts(self, event: &Event) -> bool {
        match self {
            StateFilter::All => true,
            StateFilter::Completed => event.state == EventState::Completed,
            StateFilter::Continued => event.state == EventState::Continued,
            StateFilter::ZeroDur => event.dur == 0,
            StateFilter::NonZeroDur => event.dur != 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StateFilter::All => "all",
            StateFilter::Completed => "completed",
            StateFilter::Continued => "continued",
            StateFilter::ZeroDur => "zerodur",
            StateFilter::NonZeroDur => "nonzerodur",
        }
    }
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown state filter name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown state filter '{0}' (expected all, completed, continued, zerodur or nonzerodur)")]
pub struct UnknownStateFilter(pub String);

impl FromStr for StateFilter {
    type Err = UnknownStateFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StateFilter::All),
            "completed" => Ok(StateFilter::Completed),
            "continued" => Ok(StateFilter::Continued),
            "zerodur" => Ok(StateFilter::ZeroDur),
            "nonzerodur" => Ok(StateFilter::NonZeroDur),
            _ => Err(UnknownStateFilter(s.to_string())),
        }
    }
}

/// The selection part of a filter
///
/// Empty id lists match any id; a zero time span disables the window.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub sender_ids: Vec<Id>,
    pub event_ids: Vec<Id>,
    pub time_span_ms: u64,
    pub state_filter: StateFilter,
}

impl FilterCriteria {
    /// Criteria matching every event
    pub fn any() -> Self {
        Self::default()
    }

    pub fn senders(mut self, ids: impl IntoIterator<Item = Id>) -> Self {
        self.sender_ids = ids.into_iter().collect();
        self
    }

    pub fn events(mut self, ids: impl IntoIterator<Item = Id>) -> Self {
        self.event_ids = ids.into_iter().collect();
        self
    }

    pub fn within(mut self, time_span_ms: u64) -> Self {
        self.time_span_ms = time_span_ms;
        self
    }

    pub fn state(mut self, state_filter: StateFilter) -> Self {
        self.state_filter = state_filter;
        self
    }

    /// Whether the time-window test applies
    pub fn is_windowed(&self) -> bool {
        self.time_span_ms > 0
    }

    /// The core predicate
    ///
    /// The window test subtracts on unsigned integers: an event stamped after
    /// `reference_time` wraps to a huge age and never passes.
    pub fn matches(&self, event: &Event, reference_time: u64, apply_time_window: bool) -> bool {
        if !self.state_filter.accepts(event) {
            return false;
        }
        if !self.sender_ids.is_empty() && !self.sender_ids.contains(&event.sender_id) {
            return false;
        }
        if !self.event_ids.is_empty() && !self.event_ids.contains(&event.event_id) {
            return false;
        }
        if apply_time_window && reference_time.wrapping_sub(event.time) > self.time_span_ms {
            return false;
        }
        true
    }
}

/// A lazy, criteria-based view over an event source
pub struct EventFilter<S> {
    criteria: FilterCriteria,
    reference_time: u64,
    source: S,
}

impl<S: EventSource> EventFilter<S> {
    pub fn new(source: S, criteria: FilterCriteria) -> Self {
        Self {
            criteria,
            reference_time: 0,
            source,
        }
    }

    /// A filter that passes everything from `source`
    pub fn unfiltered(source: S) -> Self {
        Self::new(source, FilterCriteria::any())
    }

    /// Replace all criteria at once
    pub fn set(
        &mut self,
        sender_ids: &[Id],
        event_ids: &[Id],
        time_span_ms: u64,
        state_filter: StateFilter,
    ) {
        self.criteria = FilterCriteria {
            sender_ids: sender_ids.to_vec(),
            event_ids: event_ids.to_vec(),
            time_span_ms,
            state_filter,
        };
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Set the time used by the window test; the cursor does not move
    pub fn set_reference_time(&mut self, time: u64) {
        self.reference_time = time;
    }

    pub fn reference_time(&self) -> u64 {
        self.reference_time
    }

    pub fn matches(&self, event: &Event, apply_time_window: bool) -> bool {
        self.criteria
            .matches(event, self.reference_time, apply_time_window)
    }

    /// Bind a new source, keeping criteria and reference time
    pub fn bind(&mut self, source: S) -> S {
        std::mem::replace(&mut self.source, source)
    }

    /// Rebind the criteria to a source of another type
    pub fn rebind<T: EventSource>(self, source: T) -> EventFilter<T> {
        EventFilter {
            criteria: self.criteria,
            reference_time: self.reference_time,
            source,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Drop the criteria and restore defaults
    ///
    /// Afterwards the filter matches any sender and event, has no time window
    /// and uses [`StateFilter::All`].
    pub fn release(&mut self) {
        self.criteria = FilterCriteria::any();
    }
}

impl<S: EventSource> EventSource for EventFilter<S> {
    fn reset(&mut self) {
        self.source.reset();
    }

    fn next(&mut self) -> Option<Arc<Event>> {
        let windowed = self.criteria.is_windowed();
        loop {
            let event = self.source.next()?;
            if self
                .criteria
                .matches(&event, self.reference_time, windowed)
            {
                return Some(event);
            }
        }
    }
}

impl<S> fmt::Debug for EventFilter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFilter")
            .field("criteria", &self.criteria)
            .field("reference_time", &self.reference_time)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;

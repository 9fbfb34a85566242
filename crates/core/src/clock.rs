// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline clock abstraction for testable time handling

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A clock that reports elapsed pipeline time in milliseconds
pub trait Clock: Clone + Send + Sync + 'static {
    fn now_ms(&self) -> u64;
}

/// Real monotonic clock, counting from its creation
#[derive(Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// A clock whose zero lies at `start`
    pub fn started_at(start: Instant) -> Self {
        Self { start }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone, Default)]
pub struct FakeClock {
    current: Arc<AtomicU64>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake clock reading `ms`
    pub fn at(ms: u64) -> Self {
        let clock = Self::new();
        clock.set(ms);
        clock
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.current.fetch_add(ms, Ordering::SeqCst);
    }

    /// Set the clock to a specific pipeline time
    pub fn set(&self, ms: u64) {
        self.current.store(ms, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;

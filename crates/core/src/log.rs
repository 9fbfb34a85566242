// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only event log
//!
//! Entries live in fixed-size chunks that are never moved once allocated, so
//! a [`LogView`] taken under the append lock can read every entry below its
//! length without further synchronization.

use crate::event::Event;
use crate::source::EventSource;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

/// Default number of entries per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

struct Chunk {
    slots: Box<[OnceLock<Arc<Event>>]>,
}

impl Chunk {
    fn new(size: usize) -> Self {
        Self {
            slots: (0..size).map(|_| OnceLock::new()).collect(),
        }
    }
}

#[derive(Default)]
struct LogState {
    chunks: Vec<Arc<Chunk>>,
    len: usize,
}

/// Process-wide, arrival-ordered store of events
pub struct EventLog {
    chunk_size: usize,
    state: Mutex<LogState>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            state: Mutex::new(LogState::default()),
        }
    }

    /// Append an event, returning its index and the shared entry
    pub fn append(&self, event: Event) -> (usize, Arc<Event>) {
        let event = Arc::new(event);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let index = state.len;
        let chunk_index = index / self.chunk_size;
        if chunk_index == state.chunks.len() {
            state.chunks.push(Arc::new(Chunk::new(self.chunk_size)));
        }
        // Slots below `len` are always set and slots at `len` never are
        let _ = state.chunks[chunk_index].slots[index % self.chunk_size].set(Arc::clone(&event));
        state.len += 1;

        (index, event)
    }

    /// Current number of entries
    pub fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capture the current length together with the chunks backing it
    ///
    /// Events appended afterwards are not visible through the returned view.
    pub fn snapshot(&self) -> LogView {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        LogView {
            chunks: state.chunks.clone(),
            chunk_size: self.chunk_size,
            len: state.len,
            start: 0,
            end: state.len,
            cursor: 0,
        }
    }

    /// A cursor over everything appended so far
    pub fn view(&self) -> LogView {
        self.snapshot()
    }

    /// Drop every entry
    ///
    /// Views taken before the call keep their entries.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.chunks.clear();
        state.len = 0;
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("chunk_size", &self.chunk_size)
            .field("len", &self.len())
            .finish()
    }
}

/// A lock-free cursor over a range of a log snapshot
#[derive(Clone, Default)]
pub struct LogView {
    chunks: Vec<Arc<Chunk>>,
    chunk_size: usize,
    len: usize,
    start: usize,
    end: usize,
    cursor: usize,
}

impl LogView {
    /// Restrict the view to log indices `[start, end)`, clamped to the snapshot
    pub fn range(&self, start: usize, end: usize) -> LogView {
        let end = end.min(self.len);
        let start = start.min(end);
        LogView {
            chunks: self.chunks.clone(),
            chunk_size: self.chunk_size,
            len: self.len,
            start,
            end,
            cursor: start,
        }
    }

    /// Log index of the first entry in the view
    pub fn start(&self) -> usize {
        self.start
    }

    /// Log index one past the last entry in the view
    pub fn end(&self) -> usize {
        self.end
    }

    /// Length of the log when the snapshot was taken
    pub fn snapshot_len(&self) -> usize {
        self.len
    }

    fn entry(&self, index: usize) -> Option<Arc<Event>> {
        let chunk = self.chunks.get(index / self.chunk_size)?;
        chunk.slots[index % self.chunk_size].get().cloned()
    }
}

impl EventSource for LogView {
    fn reset(&mut self) {
        self.cursor = self.start;
    }

    fn next(&mut self) -> Option<Arc<Event>> {
        if self.cursor >= self.end {
            return None;
        }
        let event = self.entry(self.cursor)?;
        self.cursor += 1;
        Some(event)
    }
}

impl fmt::Debug for LogView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogView")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;

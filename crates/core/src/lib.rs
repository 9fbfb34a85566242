// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! evboard-core: data model of the event bus
//!
//! This crate provides:
//! - `Event` records and their payloads
//! - `EventLog`, the append-only, arrival-ordered store
//! - `EventSource` cursors and `EventFilter` criteria views
//! - Listener address parsing
//! - Pipeline clock and string interning abstractions

pub mod address;
pub mod clock;
pub mod event;
pub mod filter;
pub mod intern;
pub mod log;
pub mod source;

pub use address::{AddressError, EventAddress};
pub use clock::{Clock, FakeClock, SystemClock};
pub use event::{Event, EventDraft, EventState, Payload, PayloadError, PayloadKind};
pub use filter::{EventFilter, FilterCriteria, StateFilter, UnknownStateFilter};
pub use intern::{Id, Interner, StringTable, INVALID_ID};
pub use log::{EventLog, LogView, DEFAULT_CHUNK_SIZE};
pub use source::{EventList, EventSource};

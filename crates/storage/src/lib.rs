// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! evboard-storage: durable event logs
//!
//! An [`EventSink`] writes events to a file in one of two formats, each
//! carrying its version in the file header. [`EventReader`] reads either
//! format back and accepts every version ever written.

mod error;
pub mod format;
mod reader;
mod sink;

pub use error::SinkError;
pub use format::{SinkFormat, SinkVersion};
pub use reader::EventReader;
pub use sink::EventSink;

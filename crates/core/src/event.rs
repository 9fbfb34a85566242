// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event records published on the bus

use crate::intern::Id;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Completion class of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventState {
    /// The occurrence is finished
    #[default]
    Completed,
    /// More data for the same logical occurrence may still arrive
    Continued,
}

impl EventState {
    pub fn as_u8(self) -> u8 {
        match self {
            EventState::Completed => 0,
            EventState::Continued => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(EventState::Completed),
            1 => Some(EventState::Continued),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EventState::Completed => "completed",
            EventState::Continued => "continued",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "completed" => Some(EventState::Completed),
            "continued" => Some(EventState::Continued),
            _ => None,
        }
    }
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wire tag of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Empty = 0,
    String = 1,
    Tuple = 2,
    Map = 3,
}

impl PayloadKind {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PayloadKind::Empty),
            1 => Some(PayloadKind::String),
            2 => Some(PayloadKind::Tuple),
            3 => Some(PayloadKind::Map),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PayloadKind::Empty => "empty",
            PayloadKind::String => "string",
            PayloadKind::Tuple => "tuple",
            PayloadKind::Map => "map",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "empty" => Some(PayloadKind::Empty),
            "string" => Some(PayloadKind::String),
            "tuple" => Some(PayloadKind::Tuple),
            "map" => Some(PayloadKind::Map),
            _ => None,
        }
    }
}

/// Data carried by an event
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Payload {
    #[default]
    Empty,
    /// Human-readable text
    String(String),
    /// Ordered list of values, e.g. a feature vector
    Tuple(Vec<f32>),
    /// Interned id to value pairs, e.g. per-class probabilities
    Map(Vec<(Id, f32)>),
}

/// Raw payload bytes could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("payload length {len} is not a multiple of {unit}")]
    Misaligned { len: usize, unit: usize },
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("empty payload carries {0} bytes")]
    TrailingBytes(usize),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Empty => PayloadKind::Empty,
            Payload::String(_) => PayloadKind::String,
            Payload::Tuple(_) => PayloadKind::Tuple,
            Payload::Map(_) => PayloadKind::Map,
        }
    }

    /// Size of the encoded payload in bytes
    pub fn byte_len(&self) -> usize {
        match self {
            Payload::Empty => 0,
            Payload::String(s) => s.len(),
            Payload::Tuple(values) => values.len() * 4,
            Payload::Map(pairs) => pairs.len() * 8,
        }
    }

    /// Encode as raw little-endian bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        match self {
            Payload::Empty => {}
            Payload::String(s) => out.extend_from_slice(s.as_bytes()),
            Payload::Tuple(values) => {
                for v in values {
                    out.extend_from_slice(&v.to_le_bytes());
                }
            }
            Payload::Map(pairs) => {
                for (id, v) in pairs {
                    out.extend_from_slice(&id.to_le_bytes());
                    out.extend_from_slice(&v.to_le_bytes());
                }
            }
        }
        out
    }

    /// Decode raw bytes written by [`Payload::to_bytes`]
    pub fn from_bytes(kind: PayloadKind, bytes: &[u8]) -> Result<Self, PayloadError> {
        match kind {
            PayloadKind::Empty if bytes.is_empty() => Ok(Payload::Empty),
            PayloadKind::Empty => Err(PayloadError::TrailingBytes(bytes.len())),
            PayloadKind::String => std::str::from_utf8(bytes)
                .map(|s| Payload::String(s.to_string()))
                .map_err(|_| PayloadError::InvalidUtf8),
            PayloadKind::Tuple => {
                check_aligned(bytes, 4)?;
                Ok(Payload::Tuple(
                    bytes
                        .chunks_exact(4)
                        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                        .collect(),
                ))
            }
            PayloadKind::Map => {
                check_aligned(bytes, 8)?;
                Ok(Payload::Map(
                    bytes
                        .chunks_exact(8)
                        .map(|c| {
                            (
                                u32::from_le_bytes([c[0], c[1], c[2], c[3]]),
                                f32::from_le_bytes([c[4], c[5], c[6], c[7]]),
                            )
                        })
                        .collect(),
                ))
            }
        }
    }
}

fn check_aligned(bytes: &[u8], unit: usize) -> Result<(), PayloadError> {
    if bytes.len() % unit == 0 {
        Ok(())
    } else {
        Err(PayloadError::Misaligned {
            len: bytes.len(),
            unit,
        })
    }
}

/// One occurrence announced on the bus
///
/// Events are shared as `Arc<Event>` once appended to the log and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Interned name of the producing component
    pub sender_id: Id,
    /// Interned name of the occurrence type
    pub event_id: Id,
    /// Start time in milliseconds on the pipeline clock
    pub time: u64,
    /// Duration in milliseconds, 0 for instantaneous occurrences
    pub dur: u64,
    pub state: EventState,
    pub payload: Payload,
    /// Confidence in [0, 1]
    pub prob: f32,
    /// Shared by sub-events of the same logical occurrence
    pub glue_id: Option<u32>,
}

impl Event {
    pub fn new(sender_id: Id, event_id: Id, time: u64) -> Self {
        Self {
            sender_id,
            event_id,
            time,
            dur: 0,
            state: EventState::Completed,
            payload: Payload::Empty,
            prob: 1.0,
            glue_id: None,
        }
    }

    pub fn with_dur(mut self, dur: u64) -> Self {
        self.dur = dur;
        self
    }

    pub fn with_state(mut self, state: EventState) -> Self {
        self.state = state;
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_prob(mut self, prob: f32) -> Self {
        self.prob = prob;
        self
    }

    pub fn with_glue(mut self, glue_id: u32) -> Self {
        self.glue_id = Some(glue_id);
        self
    }

    /// End time of the occurrence
    pub fn end(&self) -> u64 {
        self.time.saturating_add(self.dur)
    }
}

/// An event as handed to the broker by a sender
///
/// The sender id comes from the sender's handle. When `time` is unset the
/// broker stamps it from the pipeline clock.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub event_id: Id,
    pub time: Option<u64>,
    pub dur: u64,
    pub state: EventState,
    pub payload: Payload,
    pub prob: f32,
    pub glue_id: Option<u32>,
}

impl EventDraft {
    pub fn new(event_id: Id) -> Self {
        Self {
            event_id,
            time: None,
            dur: 0,
            state: EventState::Completed,
            payload: Payload::Empty,
            prob: 1.0,
            glue_id: None,
        }
    }

    pub fn at(mut self, time: u64) -> Self {
        self.time = Some(time);
        self
    }

    pub fn lasting(mut self, dur: u64) -> Self {
        self.dur = dur;
        self
    }

    pub fn continued(mut self) -> Self {
        self.state = EventState::Continued;
        self
    }

    pub fn with_state(mut self, state: EventState) -> Self {
        self.state = state;
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_prob(mut self, prob: f32) -> Self {
        self.prob = prob;
        self
    }

    pub fn with_glue(mut self, glue_id: u32) -> Self {
        self.glue_id = Some(glue_id);
        self
    }

    /// Turn the draft into an event, stamping `now` if no time was set
    pub fn into_event(self, sender_id: Id, now: u64) -> Event {
        Event {
            sender_id,
            event_id: self.event_id,
            time: self.time.unwrap_or(now),
            dur: self.dur,
            state: self.state,
            payload: self.payload,
            prob: self.prob,
            glue_id: self.glue_id,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

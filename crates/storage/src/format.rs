// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk record formats
//!
//! Binary files start with the magic bytes `EVB\0` and a little-endian `u16`
//! version, followed by one record per event:
//!
//! ```text
//! v1: sender u32 | event u32 | time u32 | dur u32 | state u8 | type u8 | len u32 | payload
//! v2: sender u32 | event u32 | time u32 | dur u32 | state u8 | type u8 | glue u32 | prob f32 | len u32 | payload | crc32
//! ```
//!
//! ASCII files start with `#evboard ascii v<N>` and hold one tab-separated
//! line per event with the same fields. Floats are written in their shortest
//! exact decimal form; NaN is written as its raw bits (`0x7fc00000`) so every
//! payload survives a round trip. A version may change the record layout
//! anywhere, so readers branch on the version stored in the file header.

use crate::error::SinkError;
use evboard_core::{Event, EventState, Payload, PayloadKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;
use thiserror::Error;

/// Leading bytes of a binary event log
pub const MAGIC: [u8; 4] = *b"EVB\0";

/// Prefix of the first line of an ASCII event log
pub const ASCII_HEADER: &str = "#evboard ascii v";

/// Stored glue id meaning "not part of a glued occurrence"
const NO_GLUE: u32 = u32::MAX;

const V1_HEADER_LEN: usize = 22;
const V2_HEADER_LEN: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkFormat {
    Ascii,
    #[default]
    Binary,
}

impl SinkFormat {
    pub fn name(self) -> &'static str {
        match self {
            SinkFormat::Ascii => "ascii",
            SinkFormat::Binary => "binary",
        }
    }
}

impl fmt::Display for SinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sink format '{0}' (expected ascii or binary)")]
pub struct UnknownFormat(pub String);

impl FromStr for SinkFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" | "text" => Ok(SinkFormat::Ascii),
            "binary" | "bin" => Ok(SinkFormat::Binary),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Record layout version, stored in every file header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SinkVersion {
    /// The base layout: sender, event, time, duration, state, payload
    /// type, payload length and payload
    V1 = 1,
    /// Inserts glue id and probability before the payload length, and
    /// appends a CRC32 to each binary record
    V2 = 2,
}

impl SinkVersion {
    /// Version written by new sinks
    pub const DEFAULT: SinkVersion = SinkVersion::V2;

    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn from_u16(value: u16) -> Result<Self, SinkError> {
        match value {
            1 => Ok(SinkVersion::V1),
            2 => Ok(SinkVersion::V2),
            other => Err(SinkError::UnsupportedVersion(other)),
        }
    }

    fn extended(self) -> bool {
        self >= SinkVersion::V2
    }

    fn binary_header_len(self) -> usize {
        if self.extended() {
            V2_HEADER_LEN
        } else {
            V1_HEADER_LEN
        }
    }

    fn ascii_fields(self) -> usize {
        if self.extended() {
            9
        } else {
            7
        }
    }
}

impl Default for SinkVersion {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for SinkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.as_u16())
    }
}

fn narrow(field: &'static str, value: u64) -> Result<u32, SinkError> {
    u32::try_from(value).map_err(|_| SinkError::FieldOverflow { field, value })
}

fn stored_glue(event: &Event) -> Result<u32, SinkError> {
    match event.glue_id {
        None => Ok(NO_GLUE),
        Some(NO_GLUE) => Err(SinkError::FieldOverflow {
            field: "glue id",
            value: u64::from(NO_GLUE),
        }),
        Some(glue) => Ok(glue),
    }
}

fn corrupted(record: u64, reason: impl Into<String>) -> SinkError {
    SinkError::Corrupted {
        record,
        reason: reason.into(),
    }
}

// -- binary ------------------------------------------------------------------

/// Append one binary record to `out`
pub(crate) fn encode_binary(
    event: &Event,
    version: SinkVersion,
    out: &mut Vec<u8>,
) -> Result<(), SinkError> {
    let time = narrow("time", event.time)?;
    let dur = narrow("dur", event.dur)?;
    let payload = event.payload.to_bytes();
    let payload_len = narrow("payload length", payload.len() as u64)?;
    let glue = if version.extended() {
        stored_glue(event)?
    } else {
        NO_GLUE
    };

    let start = out.len();
    out.extend_from_slice(&event.sender_id.to_le_bytes());
    out.extend_from_slice(&event.event_id.to_le_bytes());
    out.extend_from_slice(&time.to_le_bytes());
    out.extend_from_slice(&dur.to_le_bytes());
    out.push(event.state.as_u8());
    out.push(event.payload.kind().as_u8());
    if version.extended() {
        out.extend_from_slice(&glue.to_le_bytes());
        out.extend_from_slice(&event.prob.to_le_bytes());
    }
    out.extend_from_slice(&payload_len.to_le_bytes());
    out.extend_from_slice(&payload);

    if version.extended() {
        let checksum = crc32fast::hash(&out[start..]);
        out.extend_from_slice(&checksum.to_le_bytes());
    }
    Ok(())
}

/// Read the next binary record
///
/// Returns `Ok(None)` at a clean end of file. A record cut short anywhere
/// else is reported as corrupted.
pub(crate) fn decode_binary(
    input: &mut impl Read,
    version: SinkVersion,
    record: u64,
) -> Result<Option<Event>, SinkError> {
    let mut header = [0u8; V2_HEADER_LEN];
    let header = &mut header[..version.binary_header_len()];
    match fill(input, header)? {
        0 => return Ok(None),
        n if n < header.len() => return Err(corrupted(record, "truncated record header")),
        _ => {}
    }

    let mut fields = Fields::new(header);
    let sender_id = fields.u32();
    let event_id = fields.u32();
    let time = fields.u32();
    let dur = fields.u32();
    let state = fields.u8();
    let kind = fields.u8();
    let (glue, prob) = if version.extended() {
        (fields.u32(), fields.f32())
    } else {
        (NO_GLUE, 1.0)
    };
    let payload_len = fields.u32();

    let mut payload = Vec::new();
    (&mut *input)
        .take(u64::from(payload_len))
        .read_to_end(&mut payload)?;
    if payload.len() != payload_len as usize {
        return Err(corrupted(record, "truncated payload"));
    }

    if version.extended() {
        let mut stored = [0u8; 4];
        if fill(input, &mut stored)? < stored.len() {
            return Err(corrupted(record, "missing checksum"));
        }
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(header);
        hasher.update(&payload);
        if hasher.finalize() != u32::from_le_bytes(stored) {
            return Err(SinkError::ChecksumMismatch { record });
        }
    }

    let state = EventState::from_u8(state)
        .ok_or_else(|| corrupted(record, format!("unknown state {}", state)))?;
    let kind = PayloadKind::from_u8(kind)
        .ok_or_else(|| corrupted(record, format!("unknown payload type {}", kind)))?;
    let payload =
        Payload::from_bytes(kind, &payload).map_err(|e| corrupted(record, e.to_string()))?;

    let mut event = Event::new(sender_id, event_id, u64::from(time))
        .with_dur(u64::from(dur))
        .with_state(state)
        .with_payload(payload)
        .with_prob(prob);
    if glue != NO_GLUE {
        event = event.with_glue(glue);
    }
    Ok(Some(event))
}

/// Read until `buf` is full or the input ends; returns the bytes read
fn fill(input: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut read = 0;
    while read < buf.len() {
        match input.read(&mut buf[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(read)
}

struct Fields<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Fields<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn f32(&mut self) -> f32 {
        f32::from_le_bytes(self.take())
    }
}

// -- ascii -------------------------------------------------------------------

pub(crate) fn ascii_header(version: SinkVersion) -> String {
    format!("{}{}", ASCII_HEADER, version.as_u16())
}

/// Render one event as a tab-separated line, without the newline
pub(crate) fn encode_ascii(event: &Event, version: SinkVersion) -> Result<String, SinkError> {
    let time = narrow("time", event.time)?;
    let dur = narrow("dur", event.dur)?;

    let mut line = format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        event.sender_id,
        event.event_id,
        time,
        dur,
        event.state.name(),
        event.payload.kind().name()
    );
    if version.extended() {
        match stored_glue(event)? {
            NO_GLUE => line.push_str("\t-"),
            glue => line.push_str(&format!("\t{}", glue)),
        }
        line.push('\t');
        line.push_str(&float_text(event.prob));
    }
    line.push('\t');
    line.push_str(&payload_text(&event.payload)?);
    Ok(line)
}

fn payload_text(payload: &Payload) -> Result<String, SinkError> {
    Ok(match payload {
        Payload::Empty => String::new(),
        Payload::String(s) => serde_json::to_string(s).map_err(io::Error::from)?,
        Payload::Tuple(values) => values
            .iter()
            .map(|v| float_text(*v))
            .collect::<Vec<_>>()
            .join(" "),
        Payload::Map(pairs) => pairs
            .iter()
            .map(|(id, value)| format!("{}={}", id, float_text(*value)))
            .collect::<Vec<_>>()
            .join(" "),
    })
}

/// Parse one line written by [`encode_ascii`]
pub(crate) fn decode_ascii(line: &str, version: SinkVersion, record: u64) -> Result<Event, SinkError> {
    let expected = version.ascii_fields();
    let fields: Vec<&str> = line.splitn(expected, '\t').collect();
    if fields.len() != expected {
        return Err(corrupted(
            record,
            format!("expected {} fields, found {}", expected, fields.len()),
        ));
    }

    let sender_id = parse_field(record, "sender", fields[0])?;
    let event_id = parse_field(record, "event", fields[1])?;
    let time: u32 = parse_field(record, "time", fields[2])?;
    let dur: u32 = parse_field(record, "dur", fields[3])?;
    let state = EventState::from_name(fields[4])
        .ok_or_else(|| corrupted(record, format!("unknown state '{}'", fields[4])))?;
    let kind = PayloadKind::from_name(fields[5])
        .ok_or_else(|| corrupted(record, format!("unknown payload type '{}'", fields[5])))?;

    let mut event = Event::new(sender_id, event_id, u64::from(time))
        .with_dur(u64::from(dur))
        .with_state(state);

    if version.extended() {
        if fields[6] != "-" {
            event = event.with_glue(parse_field(record, "glue", fields[6])?);
        }
        event = event.with_prob(parse_float(record, "prob", fields[7])?);
    }

    let payload = parse_payload(kind, fields[expected - 1], record)?;
    Ok(event.with_payload(payload))
}

fn parse_field<T: FromStr>(record: u64, name: &str, text: &str) -> Result<T, SinkError> {
    text.trim()
        .parse()
        .map_err(|_| corrupted(record, format!("invalid {} '{}'", name, text)))
}

/// Decimal for numbers and infinities, raw bits for NaN
fn float_text(value: f32) -> String {
    if value.is_nan() {
        format!("0x{:08x}", value.to_bits())
    } else {
        value.to_string()
    }
}

fn parse_float(record: u64, name: &str, text: &str) -> Result<f32, SinkError> {
    match text.trim().strip_prefix("0x") {
        Some(bits) => u32::from_str_radix(bits, 16)
            .map(f32::from_bits)
            .map_err(|_| corrupted(record, format!("invalid {} '{}'", name, text))),
        None => parse_field(record, name, text),
    }
}

fn parse_payload(kind: PayloadKind, text: &str, record: u64) -> Result<Payload, SinkError> {
    match kind {
        PayloadKind::Empty if text.is_empty() => Ok(Payload::Empty),
        PayloadKind::Empty => Err(corrupted(record, "empty payload carries data")),
        PayloadKind::String => serde_json::from_str(text)
            .map(Payload::String)
            .map_err(|e| corrupted(record, format!("invalid string payload: {}", e))),
        PayloadKind::Tuple => text
            .split_whitespace()
            .map(|v| parse_float(record, "tuple value", v))
            .collect::<Result<Vec<f32>, _>>()
            .map(Payload::Tuple),
        PayloadKind::Map => text
            .split_whitespace()
            .map(|pair| -> Result<(u32, f32), SinkError> {
                let (id, value) = pair
                    .split_once('=')
                    .ok_or_else(|| corrupted(record, format!("invalid map entry '{}'", pair)))?;
                Ok((
                    parse_field(record, "map id", id)?,
                    parse_float(record, "map value", value)?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Payload::Map),
    }
}

/// Version named by an ASCII header line, if the line is one
pub(crate) fn parse_ascii_header(line: &str) -> Option<Result<SinkVersion, SinkError>> {
    let version = line.trim_end().strip_prefix(ASCII_HEADER)?;
    Some(
        version
            .parse::<u16>()
            .map_err(|_| SinkError::BadMagic)
            .and_then(SinkVersion::from_u16),
    )
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;

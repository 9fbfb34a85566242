// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors that can occur when writing or reading a stored event log
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{field} {value} does not fit the 32-bit record field")]
    FieldOverflow { field: &'static str, value: u64 },
    #[error("corrupted record {record}: {reason}")]
    Corrupted { record: u64, reason: String },
    #[error("checksum mismatch in record {record}")]
    ChecksumMismatch { record: u64 },
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),
    #[error("not an event log")]
    BadMagic,
}

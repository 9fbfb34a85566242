// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reader for stored event logs
//!
//! The format is sniffed from the file header and every record is decoded
//! with the layout of the stored version. Iteration stops at the first
//! corrupted record.

use crate::error::SinkError;
use crate::format::{self, SinkFormat, SinkVersion, MAGIC};
use evboard_core::{Event, EventList};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

pub struct EventReader {
    path: PathBuf,
    format: SinkFormat,
    version: SinkVersion,
    input: BufReader<File>,
    record: u64,
    done: bool,
    line: String,
}

impl EventReader {
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        let mut input = BufReader::new(File::open(path)?);

        let mut magic = [0u8; 4];
        let mut read = 0;
        while read < magic.len() {
            match input.read(&mut magic[read..])? {
                0 => return Err(SinkError::BadMagic),
                n => read += n,
            }
        }

        let (format, version) = if magic == MAGIC {
            let mut version = [0u8; 2];
            input
                .read_exact(&mut version)
                .map_err(|_| SinkError::BadMagic)?;
            (
                SinkFormat::Binary,
                SinkVersion::from_u16(u16::from_le_bytes(version))?,
            )
        } else {
            let mut header = String::from_utf8_lossy(&magic).into_owned();
            input.read_line(&mut header)?;
            let version = format::parse_ascii_header(&header).ok_or(SinkError::BadMagic)??;
            (SinkFormat::Ascii, version)
        };

        Ok(Self {
            path: path.to_path_buf(),
            format,
            version,
            input,
            record: 0,
            done: false,
            line: String::new(),
        })
    }

    /// Read every remaining event
    pub fn read_all(self) -> Result<EventList, SinkError> {
        let mut list = EventList::new();
        for event in self {
            list.push(event?);
        }
        Ok(list)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> SinkFormat {
        self.format
    }

    pub fn version(&self) -> SinkVersion {
        self.version
    }

    /// Records read so far
    pub fn records(&self) -> u64 {
        self.record
    }

    fn read_ascii(&mut self) -> Result<Option<Event>, SinkError> {
        loop {
            self.line.clear();
            if self.input.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            let line = self.line.trim_end_matches(['\n', '\r']);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return format::decode_ascii(line, self.version, self.record).map(Some);
        }
    }
}

impl Iterator for EventReader {
    type Item = Result<Event, SinkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = match self.format {
            SinkFormat::Binary => format::decode_binary(&mut self.input, self.version, self.record),
            SinkFormat::Ascii => self.read_ascii(),
        };

        match result {
            Ok(Some(event)) => {
                self.record += 1;
                Some(Ok(event))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event sink for durable logging

use crate::error::SinkError;
use crate::format::{self, SinkFormat, SinkVersion, MAGIC};
use evboard_core::{Event, EventSource};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes events to a file
///
/// The file is created (or truncated) on open and starts with a header
/// naming the format version. Records are buffered; call
/// [`flush`](Self::flush) or [`close`](Self::close) to get them to disk.
pub struct EventSink {
    path: PathBuf,
    format: SinkFormat,
    version: SinkVersion,
    writer: BufWriter<File>,
    count: u64,
    scratch: Vec<u8>,
}

impl EventSink {
    pub fn open(path: &Path, format: SinkFormat, version: SinkVersion) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(path)?);
        match format {
            SinkFormat::Binary => {
                writer.write_all(&MAGIC)?;
                writer.write_all(&version.as_u16().to_le_bytes())?;
            }
            SinkFormat::Ascii => {
                writeln!(writer, "{}", format::ascii_header(version))?;
            }
        }
        debug!(path = %path.display(), %format, %version, "opened event sink");

        Ok(Self {
            path: path.to_path_buf(),
            format,
            version,
            writer,
            count: 0,
            scratch: Vec::new(),
        })
    }

    /// Open with the current default version
    pub fn create(path: &Path, format: SinkFormat) -> Result<Self, SinkError> {
        Self::open(path, format, SinkVersion::DEFAULT)
    }

    /// Append one event
    ///
    /// Nothing is written when the event does not fit the record layout.
    pub fn write(&mut self, event: &Event) -> Result<(), SinkError> {
        match self.format {
            SinkFormat::Binary => {
                self.scratch.clear();
                format::encode_binary(event, self.version, &mut self.scratch)?;
                self.writer.write_all(&self.scratch)?;
            }
            SinkFormat::Ascii => {
                let line = format::encode_ascii(event, self.version)?;
                writeln!(self.writer, "{}", line)?;
            }
        }
        self.count += 1;
        Ok(())
    }

    /// Append every event of a view, from its first entry
    ///
    /// Returns the number of events written. The view is left exhausted.
    pub fn write_view(&mut self, view: &mut dyn EventSource) -> Result<usize, SinkError> {
        view.reset();
        let mut written = 0;
        while let Some(event) = view.next() {
            self.write(&event)?;
            written += 1;
        }
        Ok(written)
    }

    pub fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush, sync to disk and close; returns the number of events written
    pub fn close(self) -> Result<u64, SinkError> {
        let count = self.count;
        let path = self.path;
        let file = self.writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        debug!(path = %path.display(), count, "closed event sink");
        Ok(count)
    }

    /// Events written so far
    pub fn count(&self) -> u64 {
        self.count
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
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;

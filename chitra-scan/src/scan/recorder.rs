//! Row sample buffer and row log sinks
//!
//! Samples of the row in progress are kept in scan order. When the row is
//! emitted a backward row is reversed first, so every record in the log reads
//! left to right in physical order.

use crate::core::driver::ReflectanceSensor;
use crate::core::types::Direction;
use crate::error::Result;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// Destination for finished rows
pub trait RowSink: Send {
    /// Persist one row, already in left-to-right order
    fn write_row(&mut self, samples: &[u8]) -> Result<()>;
}

/// Plain text row log: one line per row, comma separated, no header
pub struct CsvRowLog {
    writer: BufWriter<File>,
}

impl CsvRowLog {
    /// Create the log file, truncating any previous session
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        log::info!("Row log: {}", path.display());
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

/// Format a row as it appears in the log (without the newline)
pub fn format_row(samples: &[u8]) -> String {
    samples
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl RowSink for CsvRowLog {
    fn write_row(&mut self, samples: &[u8]) -> Result<()> {
        writeln!(self.writer, "{}", format_row(samples))?;
        self.writer.flush()?;
        Ok(())
    }
}

/// In-memory row log; clones share the same rows
#[derive(Clone, Default)]
pub struct MemoryRowLog {
    rows: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MemoryRowLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every row written so far
    pub fn rows(&self) -> Vec<Vec<u8>> {
        self.rows.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }
}

impl RowSink for MemoryRowLog {
    fn write_row(&mut self, samples: &[u8]) -> Result<()> {
        self.rows.lock().push(samples.to_vec());
        Ok(())
    }
}

/// Accumulates the samples of the current row
#[derive(Debug)]
pub struct RowRecorder {
    buffer: Vec<u8>,
    capacity: usize,
    dropped: usize,
}

impl RowRecorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Read the sensor once and keep the value if the row has room
    ///
    /// Samples past the capacity are dropped silently; the sensor is still
    /// read so a failing sensor is noticed even on an overlong row.
    pub fn sample(&mut self, sensor: &mut dyn ReflectanceSensor) -> Result<()> {
        let value = sensor.reflectance()?;
        self.push(value);
        Ok(())
    }

    /// Append a value if the row has room
    pub fn push(&mut self, value: u8) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(value);
        } else {
            if self.dropped == 0 {
                log::debug!("Row buffer full ({} samples), dropping", self.capacity);
            }
            self.dropped += 1;
        }
    }

    /// Write the row in left-to-right order and clear the buffer
    ///
    /// `direction` is the direction the row was scanned in.
    pub fn emit(&mut self, direction: Direction, sink: &mut dyn RowSink) -> Result<usize> {
        if direction == Direction::Backward {
            self.buffer.reverse();
        }
        let len = self.buffer.len();
        let result = sink.write_row(&self.buffer);
        if self.dropped > 0 {
            log::debug!("Row emitted with {} samples dropped", self.dropped);
        }
        self.clear();
        result.map(|_| len)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.dropped = 0;
    }

    pub fn samples(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

// src/recording/buffer.rs
//! Bounded in-memory access buffer
//!
//! A pre-allocated, fixed-capacity append log mirroring recorded read
//! events, so they can be inspected after the run without re-parsing the
//! textual log. The buffer shares the recorder's lock with the sink; it
//! has no locking of its own.
//!
//! Appends past capacity are governed by an explicit [`OverflowPolicy`]:
//! an unchecked overrun is never allowed.

use crate::recording::event::{AccessKind, ThreadId};
use crate::utils::errors::{Result, TraceError};
use serde::{Deserialize, Serialize};

/// Default slot count, sized for short diagnostic runs
pub const DEFAULT_CAPACITY: usize = 2000;

/// One buffered read access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRecord {
    /// Accessing thread
    pub thread_id: ThreadId,

    /// Instruction pointer, when the engine supplied one
    pub instruction_pointer: Option<u64>,

    /// Read or write
    pub kind: AccessKind,

    /// Effective address
    pub address: u64,
}

/// What to do with an append once the buffer is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Refuse the append and count the drop; the log line is unaffected
    Reject,

    /// Ring semantics: overwrite the oldest record
    Wrap,

    /// Double the capacity
    Grow,
}

/// Bounded append log of read accesses
pub struct AccessBuffer {
    records: Vec<AccessRecord>,
    capacity: usize,
    overflow: OverflowPolicy,
    appended: u64,
    dropped: u64,
}

impl AccessBuffer {
    /// Create a buffer with `capacity` pre-allocated slots.
    pub fn new(capacity: usize, overflow: OverflowPolicy) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
            overflow,
            appended: 0,
            dropped: 0,
        }
    }

    /// Append one record, applying the overflow policy at capacity.
    ///
    /// Under [`OverflowPolicy::Reject`] a full buffer returns
    /// [`TraceError::BufferFull`] and counts the drop; the caller decides
    /// whether that is fatal (the recorder keeps logging and lets the
    /// mirror degrade).
    pub fn append(&mut self, record: AccessRecord) -> Result<()> {
        if self.capacity == 0 {
            self.dropped += 1;
            return Err(TraceError::BufferFull { capacity: 0 });
        }

        if self.records.len() < self.capacity {
            self.records.push(record);
            self.appended += 1;
            return Ok(());
        }

        match self.overflow {
            OverflowPolicy::Reject => {
                self.dropped += 1;
                Err(TraceError::BufferFull { capacity: self.capacity })
            }
            OverflowPolicy::Wrap => {
                let slot = (self.appended % self.capacity as u64) as usize;
                self.records[slot] = record;
                self.appended += 1;
                Ok(())
            }
            OverflowPolicy::Grow => {
                self.capacity *= 2;
                self.records.reserve(self.capacity - self.records.len());
                self.records.push(record);
                self.appended += 1;
                Ok(())
            }
        }
    }

    /// Records currently held, oldest first.
    ///
    /// Under `Wrap` the returned order is still append order: the slice is
    /// rotated so the oldest surviving record comes first.
    pub fn snapshot(&self) -> Vec<AccessRecord> {
        if self.appended as usize <= self.capacity {
            return self.records.clone();
        }
        let start = (self.appended % self.capacity as u64) as usize;
        let mut out = Vec::with_capacity(self.records.len());
        out.extend_from_slice(&self.records[start..]);
        out.extend_from_slice(&self.records[..start]);
        out
    }

    /// Serialize the current snapshot as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| TraceError::ExportFailed(format!("JSON serialization error: {e}")))
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the buffer holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current capacity (may exceed the initial value under `Grow`)
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Buffer counters
    pub fn stats(&self) -> BufferStats {
        BufferStats {
            appended: self.appended,
            dropped: self.dropped,
            current_size: self.records.len(),
            capacity: self.capacity,
        }
    }
}

/// Buffer statistics
#[derive(Debug, Clone)]
pub struct BufferStats {
    /// Total records accepted
    pub appended: u64,

    /// Total appends refused at capacity
    pub dropped: u64,

    /// Records currently held
    pub current_size: usize,

    /// Slot capacity
    pub capacity: usize,
}

impl BufferStats {
    /// Calculate fill percentage
    pub fn fill_percentage(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        (self.current_size as f64 / self.capacity as f64) * 100.0
    }

    /// Calculate drop rate over all attempted appends
    pub fn drop_rate(&self) -> f64 {
        let attempted = self.appended + self.dropped;
        if attempted == 0 {
            0.0
        } else {
            (self.dropped as f64 / attempted as f64) * 100.0
        }
    }
}

// src/recording/event.rs
//! Trace event model and line formatting
//!
//! Events are immutable once constructed and are written to the sink whole
//! or not at all. Two line formats exist, matching the two generations of
//! the on-disk log:
//!
//! - **Compact**: access lines carry thread id and effective address only
//! - **Annotated**: access lines additionally carry the instruction
//!   pointer, and the finalized log ends with a `#eof` marker

use serde::{Deserialize, Serialize};

/// Logical thread id assigned by the instrumentation engine.
///
/// Starts at 0 for the main thread and increments per newly observed
/// thread. Not an OS thread id.
pub type ThreadId = u32;

/// Marker line written before close in the annotated format
pub const END_MARKER: &str = "#eof";

/// Kind of memory operand access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Read,
    Write,
}

impl AccessKind {
    /// Verb used in log lines ("read" / "write")
    pub fn verb(&self) -> &'static str {
        match self {
            AccessKind::Read => "read",
            AccessKind::Write => "write",
        }
    }
}

/// One memory operand access, as reported by the engine pre-execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryAccess {
    /// Accessing thread
    pub thread_id: ThreadId,

    /// Read or write
    pub kind: AccessKind,

    /// Effective address touched by the operand
    pub address: u64,

    /// Address of the instruction performing the access.
    /// `None` when the engine does not supply it.
    pub instruction_pointer: Option<u64>,
}

/// Selects the on-disk line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceFormat {
    /// Thread id + address access lines, no end marker
    Compact,

    /// Instruction-pointer-annotated access lines, `#eof` before close
    Annotated,
}

impl TraceFormat {
    /// End-of-log marker for this format, if any
    pub fn end_marker(&self) -> Option<&'static str> {
        match self {
            TraceFormat::Compact => None,
            TraceFormat::Annotated => Some(END_MARKER),
        }
    }
}

/// A recordable event: a lifecycle transition or a memory access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// A thread was created
    ThreadBegin { thread_id: ThreadId },

    /// A thread terminated with the given exit code
    ThreadEnd { thread_id: ThreadId, exit_code: i32 },

    /// A memory operand was accessed
    Access(MemoryAccess),
}

impl TraceEvent {
    /// Render the event as one log line, without the trailing newline.
    pub fn format_line(&self, format: TraceFormat) -> String {
        match self {
            TraceEvent::ThreadBegin { thread_id } => {
                format!("thread begin {thread_id}")
            }
            TraceEvent::ThreadEnd { thread_id, exit_code } => {
                format!("thread end {thread_id}, code {exit_code}")
            }
            TraceEvent::Access(access) => access.format_line(format),
        }
    }
}

impl MemoryAccess {
    /// Render the access as one log line, without the trailing newline.
    pub fn format_line(&self, format: TraceFormat) -> String {
        match format {
            TraceFormat::Compact => format!(
                "thread id {}, memory {}, memory address {:#x}",
                self.thread_id,
                self.kind.verb(),
                self.address
            ),
            TraceFormat::Annotated => format!(
                "thread id {}, {:#x}: memory {}, address {:#x}",
                self.thread_id,
                self.instruction_pointer.unwrap_or(0),
                self.kind.verb(),
                self.address
            ),
        }
    }
}

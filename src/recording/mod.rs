// src/recording/mod.rs
//! Event recording
//!
//! This module is the core of the tracer:
//!
//! - **Event**: immutable event model and the two log line formats
//! - **Filter**: injectable per-event recording policy
//! - **Sink**: durable line sink, flushed per write, closed once
//! - **Buffer**: bounded in-memory mirror of recorded reads
//! - **Recorder**: the per-operand hot path tying the above together
//!
//! # Architecture
//!
//! ```text
//! Engine hook (any target thread)
//!     │
//!     ├─ policy rejects → relaxed counter, nothing else
//!     │
//!     └─ policy admits → format line
//!             │
//!         [shared lock]
//!             ├─ sink: append + flush
//!             └─ buffer: mirror read record
//!         [unlock]
//! ```
//!
//! Lock admission order is the total order of the finalized log; no line
//! is ever a byte-level interleave of two events.

pub mod buffer;
pub mod event;
pub mod filter;
pub mod recorder;
pub mod sink;

// Re-export commonly used types
pub use buffer::{AccessBuffer, AccessRecord, BufferStats, OverflowPolicy};
pub use event::{AccessKind, MemoryAccess, ThreadId, TraceEvent, TraceFormat};
pub use filter::{AccessPolicy, PolicyFn, RecordAll, ThreadSelectPolicy};
pub use recorder::{RecorderConfig, RecorderStats, TraceRecorder};
pub use sink::TraceSink;

// src/lib.rs
//! Memtrace — concurrent memory-access tracing runtime
//!
//! An external dynamic-instrumentation engine calls into this crate on
//! (almost) every instruction the monitored program executes; memtrace
//! records each admitted memory access and thread lifecycle transition
//! durably, in a total order, with no interleaved lines.
//!
//! # Architecture
//!
//! The crate is structured into a few key modules:
//!
//! - **hooks**: the engine-facing callback surface and thread bookkeeping
//! - **recording**: event model, filter policy, durable sink, bounded
//!   buffer, and the per-operand hot path
//! - **observability**: diagnostic logging (never the trace sink itself)
//! - **utils**: configuration and error types

// Public module exports
pub mod hooks;
pub mod observability;
pub mod recording;
pub mod utils;

// Re-export commonly used types
pub use hooks::callbacks::TracerHooks;
pub use hooks::thread_registry::ThreadRegistry;
pub use recording::buffer::{AccessBuffer, AccessRecord, OverflowPolicy};
pub use recording::event::{AccessKind, MemoryAccess, ThreadId, TraceEvent, TraceFormat};
pub use recording::filter::{AccessPolicy, PolicyFn, RecordAll, ThreadSelectPolicy};
pub use recording::recorder::{RecorderConfig, RecorderStats, TraceRecorder};
pub use recording::sink::TraceSink;
pub use utils::config::TracerConfig;
pub use utils::errors::{Result, TraceError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

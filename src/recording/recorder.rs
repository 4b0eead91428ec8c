// src/recording/recorder.rs
//! Access recorder: the per-operand hot path
//!
//! One `record_access` call per memory operand of every executed
//! instruction, from whichever OS thread executed it. The discipline:
//!
//! 1. Evaluate the injected policy first; rejected events touch nothing
//!    but a relaxed counter.
//! 2. Format the line outside the lock.
//! 3. Under the single shared lock: append to the sink, flush, and (read
//!    events with the buffer enabled) append the buffer record. Both
//!    effects share the critical section so the buffer and the log can
//!    never present a torn view of the same event.
//!
//! Lock admission order is the total order of the finalized log.

use crate::recording::buffer::{AccessBuffer, AccessRecord, OverflowPolicy, DEFAULT_CAPACITY};
use crate::recording::event::{AccessKind, MemoryAccess, ThreadId, TraceEvent, TraceFormat};
use crate::recording::filter::{AccessPolicy, ThreadSelectPolicy};
use crate::recording::sink::TraceSink;
use crate::utils::errors::{Result, TraceError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Recorder configuration
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// On-disk line format
    pub format: TraceFormat,

    /// Mirror recorded reads into the in-memory buffer
    pub buffer_enabled: bool,

    /// Buffer slot capacity
    pub buffer_capacity: usize,

    /// Buffer behavior at capacity
    pub overflow: OverflowPolicy,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            format: TraceFormat::Compact,
            buffer_enabled: false,
            buffer_capacity: DEFAULT_CAPACITY,
            overflow: OverflowPolicy::Reject,
        }
    }
}

/// Sink and buffer share one critical section.
struct RecorderShared {
    sink: TraceSink,
    buffer: Option<AccessBuffer>,
}

/// Serializes all trace events into the sink.
///
/// Process-scoped: construct once at startup, share by `Arc`. All methods
/// take `&self` and are safe to call concurrently from any thread.
pub struct TraceRecorder {
    policy: Arc<dyn AccessPolicy>,
    format: TraceFormat,
    shared: Mutex<RecorderShared>,
    recorded: AtomicU64,
    filtered: AtomicU64,
    lifecycle: AtomicU64,
}

impl TraceRecorder {
    /// Create a recorder over `sink` with an injected filter policy.
    pub fn new(sink: TraceSink, policy: Arc<dyn AccessPolicy>, config: RecorderConfig) -> Self {
        let buffer = config
            .buffer_enabled
            .then(|| AccessBuffer::new(config.buffer_capacity, config.overflow));

        Self {
            policy,
            format: config.format,
            shared: Mutex::new(RecorderShared { sink, buffer }),
            recorded: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            lifecycle: AtomicU64::new(0),
        }
    }

    /// Create a recorder with the historical default policy and config.
    pub fn with_defaults(sink: TraceSink) -> Self {
        Self::new(
            sink,
            Arc::new(ThreadSelectPolicy::default()),
            RecorderConfig::default(),
        )
    }

    /// Record one memory operand access. Invoked pre-execution, once per
    /// qualifying operand.
    pub fn record_access(&self, access: MemoryAccess) -> Result<()> {
        if !self.policy.should_record(access.kind, access.thread_id) {
            self.filtered.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        let line = access.format_line(self.format);

        let mut shared = self.shared.lock();
        shared.sink.write_line(&line)?;

        if access.kind == AccessKind::Read {
            if let Some(buffer) = shared.buffer.as_mut() {
                match buffer.append(AccessRecord {
                    thread_id: access.thread_id,
                    instruction_pointer: access.instruction_pointer,
                    kind: access.kind,
                    address: access.address,
                }) {
                    Ok(()) => {}
                    // Mirror degrades, logging stays complete; the buffer
                    // counts the drop.
                    Err(TraceError::BufferFull { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        drop(shared);

        self.recorded.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Record a thread-begin transition.
    pub fn thread_begin(&self, thread_id: ThreadId) -> Result<()> {
        self.write_lifecycle(TraceEvent::ThreadBegin { thread_id })
    }

    /// Record a thread-end transition.
    pub fn thread_end(&self, thread_id: ThreadId, exit_code: i32) -> Result<()> {
        self.write_lifecycle(TraceEvent::ThreadEnd { thread_id, exit_code })
    }

    fn write_lifecycle(&self, event: TraceEvent) -> Result<()> {
        let line = event.format_line(self.format);
        self.shared.lock().sink.write_line(&line)?;
        self.lifecycle.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Finalize the trace: write the format's end marker (if any) and
    /// close the sink. Valid exactly once.
    pub fn finalize(&self) -> Result<()> {
        let stats = self.stats();
        info!(
            "Finalizing trace: {} access events recorded, {} filtered, {} lifecycle events",
            stats.events_recorded, stats.events_filtered, stats.lifecycle_events
        );

        self.shared.lock().sink.close(self.format.end_marker())
    }

    /// Whether the sink still accepts events
    pub fn is_open(&self) -> bool {
        self.shared.lock().sink.is_open()
    }

    /// Records currently mirrored in the buffer, oldest first. Empty when
    /// the buffer is disabled.
    pub fn buffer_snapshot(&self) -> Vec<AccessRecord> {
        self.shared
            .lock()
            .buffer
            .as_ref()
            .map(AccessBuffer::snapshot)
            .unwrap_or_default()
    }

    /// JSON rendering of the buffer snapshot.
    pub fn buffer_json(&self) -> Result<String> {
        let snapshot = self.buffer_snapshot();
        serde_json::to_string_pretty(&snapshot)
            .map_err(|e| TraceError::ExportFailed(format!("JSON serialization error: {e}")))
    }

    /// Recorder counters
    pub fn stats(&self) -> RecorderStats {
        let shared = self.shared.lock();
        let (buffer_appended, buffer_dropped) = shared
            .buffer
            .as_ref()
            .map(|b| {
                let s = b.stats();
                (s.appended, s.dropped)
            })
            .unwrap_or((0, 0));

        RecorderStats {
            events_recorded: self.recorded.load(Ordering::Relaxed),
            events_filtered: self.filtered.load(Ordering::Relaxed),
            lifecycle_events: self.lifecycle.load(Ordering::Relaxed),
            lines_written: shared.sink.lines_written(),
            bytes_written: shared.sink.bytes_written(),
            buffer_appended,
            buffer_dropped,
        }
    }
}

/// Recorder statistics
#[derive(Debug, Clone, Default)]
pub struct RecorderStats {
    pub events_recorded: u64,
    pub events_filtered: u64,
    pub lifecycle_events: u64,
    pub lines_written: u64,
    pub bytes_written: u64,
    pub buffer_appended: u64,
    pub buffer_dropped: u64,
}

impl RecorderStats {
    /// Fraction of access events the policy admitted
    pub fn admit_rate(&self) -> f64 {
        let seen = self.events_recorded + self.events_filtered;
        if seen == 0 {
            0.0
        } else {
            self.events_recorded as f64 / seen as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::filter::RecordAll;
    use std::fs;
    use tempfile::NamedTempFile;

    fn annotated_recorder(path: &std::path::Path, buffer_capacity: usize) -> TraceRecorder {
        TraceRecorder::new(
            TraceSink::create(path).unwrap(),
            Arc::new(RecordAll),
            RecorderConfig {
                format: TraceFormat::Annotated,
                buffer_enabled: true,
                buffer_capacity,
                overflow: OverflowPolicy::Reject,
            },
        )
    }

    fn read_access(thread_id: ThreadId, address: u64) -> MemoryAccess {
        MemoryAccess {
            thread_id,
            kind: AccessKind::Read,
            address,
            instruction_pointer: Some(0x40_1000),
        }
    }

    #[test]
    fn test_filtered_event_writes_nothing() {
        let file = NamedTempFile::new().unwrap();
        let recorder = TraceRecorder::with_defaults(TraceSink::create(file.path()).unwrap());

        // Thread 0 reads are dropped by the default policy
        recorder
            .record_access(MemoryAccess {
                thread_id: 0,
                kind: AccessKind::Read,
                address: 0x1000,
                instruction_pointer: None,
            })
            .unwrap();

        recorder.finalize().unwrap();

        let contents = fs::read_to_string(file.path()).unwrap();
        assert!(contents.is_empty());
        assert_eq!(recorder.stats().events_filtered, 1);
        assert_eq!(recorder.stats().events_recorded, 0);
    }

    #[test]
    fn test_admitted_write_produces_one_line() {
        let file = NamedTempFile::new().unwrap();
        let recorder = TraceRecorder::with_defaults(TraceSink::create(file.path()).unwrap());

        recorder
            .record_access(MemoryAccess {
                thread_id: 1,
                kind: AccessKind::Write,
                address: 0x2000,
                instruction_pointer: None,
            })
            .unwrap();

        recorder.finalize().unwrap();

        let contents = fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents, "thread id 1, memory write, memory address 0x2000\n");
    }

    #[test]
    fn test_buffer_and_log_stay_consistent() {
        let file = NamedTempFile::new().unwrap();
        let recorder = annotated_recorder(file.path(), 100);

        for addr in [0xa0, 0xa8, 0xb0] {
            recorder.record_access(read_access(2, addr)).unwrap();
        }
        recorder.finalize().unwrap();

        let snapshot = recorder.buffer_snapshot();
        assert_eq!(snapshot.len(), 3);

        let contents = fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        // 3 access lines + #eof
        assert_eq!(lines.len(), 4);

        // Index-by-index consistency between buffer and log
        for (record, line) in snapshot.iter().zip(&lines) {
            assert!(line.contains(&format!("address {:#x}", record.address)));
            assert!(line.starts_with(&format!("thread id {}", record.thread_id)));
        }
        assert_eq!(lines[3], "#eof");
    }

    #[test]
    fn test_writes_not_mirrored_to_buffer() {
        let file = NamedTempFile::new().unwrap();
        let recorder = annotated_recorder(file.path(), 100);

        recorder
            .record_access(MemoryAccess {
                thread_id: 1,
                kind: AccessKind::Write,
                address: 0x3000,
                instruction_pointer: Some(0x40_2000),
            })
            .unwrap();

        assert!(recorder.buffer_snapshot().is_empty());
        assert_eq!(recorder.stats().events_recorded, 1);
    }

    #[test]
    fn test_buffer_overflow_keeps_logging() {
        let file = NamedTempFile::new().unwrap();
        let recorder = annotated_recorder(file.path(), 2);

        for addr in 1..=3u64 {
            recorder.record_access(read_access(2, addr)).unwrap();
        }
        recorder.finalize().unwrap();

        let stats = recorder.stats();
        assert_eq!(stats.buffer_appended, 2);
        assert_eq!(stats.buffer_dropped, 1);
        assert_eq!(stats.events_recorded, 3);

        // All three events reached the log regardless
        let contents = fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents.lines().filter(|l| l.contains("memory read")).count(), 3);
    }

    #[test]
    fn test_lifecycle_lines_interleave_with_accesses() {
        let file = NamedTempFile::new().unwrap();
        let recorder = annotated_recorder(file.path(), 10);

        recorder.thread_begin(2).unwrap();
        recorder.record_access(read_access(2, 0x50)).unwrap();
        recorder.thread_end(2, 0).unwrap();
        recorder.finalize().unwrap();

        let contents = fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "thread begin 2");
        assert_eq!(lines[1], "thread id 2, 0x401000: memory read, address 0x50");
        assert_eq!(lines[2], "thread end 2, code 0");
        assert_eq!(lines[3], "#eof");
    }

    #[test]
    fn test_record_after_finalize_fails() {
        let file = NamedTempFile::new().unwrap();
        let recorder = annotated_recorder(file.path(), 10);

        recorder.finalize().unwrap();
        assert!(!recorder.is_open());

        let result = recorder.record_access(read_access(2, 0x50));
        assert!(matches!(result, Err(TraceError::SinkClosed)));
    }

    #[test]
    fn test_double_finalize_fails() {
        let file = NamedTempFile::new().unwrap();
        let recorder = annotated_recorder(file.path(), 10);

        recorder.finalize().unwrap();
        assert!(matches!(recorder.finalize(), Err(TraceError::SinkClosed)));
    }

    #[test]
    fn test_buffer_json_export() {
        let file = NamedTempFile::new().unwrap();
        let recorder = annotated_recorder(file.path(), 10);

        recorder.record_access(read_access(2, 0x60)).unwrap();

        let json = recorder.buffer_json().unwrap();
        let parsed: Vec<AccessRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].address, 0x60);
    }
}

// src/hooks/thread_registry.rs
//! Live-thread bookkeeping
//!
//! Tracks which engine-assigned thread ids are currently live, plus
//! lifetime counters. Purely diagnostic: anomalies (a begin reported
//! twice, an end without a begin) are logged via `tracing` and never
//! touch the trace sink, which mirrors exactly what the engine reported.

use crate::recording::event::ThreadId;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Per-thread state while live
#[derive(Debug, Clone, Copy)]
pub struct ThreadState {
    /// Observation order: 0 for the first begin seen, then incrementing
    pub sequence: u64,
}

/// Registry of threads observed via lifecycle hooks
#[derive(Debug, Default)]
pub struct ThreadRegistry {
    live: DashMap<ThreadId, ThreadState>,
    seen: AtomicU64,
    ended: AtomicU64,
    peak_live: AtomicU64,
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a thread-begin. Duplicate begins for a live id are
    /// tolerated and warned about.
    pub fn register_begin(&self, thread_id: ThreadId) {
        let sequence = self.seen.fetch_add(1, Ordering::Relaxed);
        if self.live.insert(thread_id, ThreadState { sequence }).is_some() {
            warn!(thread_id, "thread begin reported twice for a live thread");
        }
        self.peak_live
            .fetch_max(self.live.len() as u64, Ordering::Relaxed);
    }

    /// Register a thread-end. An end without a matching begin is
    /// tolerated and warned about.
    pub fn register_end(&self, thread_id: ThreadId, exit_code: i32) {
        if self.live.remove(&thread_id).is_none() {
            warn!(thread_id, exit_code, "thread end without a matching begin");
        }
        self.ended.fetch_add(1, Ordering::Relaxed);
    }

    /// Whether `thread_id` is currently between begin and end
    pub fn is_live(&self, thread_id: ThreadId) -> bool {
        self.live.contains_key(&thread_id)
    }

    /// Threads currently live
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Total thread-begin transitions observed
    pub fn seen_count(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }

    /// Total thread-end transitions observed
    pub fn ended_count(&self) -> u64 {
        self.ended.load(Ordering::Relaxed)
    }

    /// Highest number of simultaneously live threads observed
    pub fn peak_live(&self) -> u64 {
        self.peak_live.load(Ordering::Relaxed)
    }
}

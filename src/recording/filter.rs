// src/recording/filter.rs
//! Access filtering policy
//!
//! The filter decides, per (kind, thread id) pair, whether an access is
//! worth recording at all. It runs before any formatting or locking on the
//! hot path, so it must be pure and cheap. Policies are injected at
//! recorder construction; the default reproduces the historical log
//! byte-for-byte.

use crate::recording::event::{AccessKind, ThreadId};
use std::collections::HashSet;

/// Decision policy for whether an access event is recorded.
///
/// Implementations must be pure: two calls with the same arguments return
/// the same answer.
pub trait AccessPolicy: Send + Sync {
    fn should_record(&self, kind: AccessKind, thread_id: ThreadId) -> bool;
}

/// Adapter turning any `Fn(AccessKind, ThreadId) -> bool` closure into a
/// policy, so tests can substitute arbitrary predicates.
pub struct PolicyFn<F>(pub F);

impl<F> AccessPolicy for PolicyFn<F>
where
    F: Fn(AccessKind, ThreadId) -> bool + Send + Sync,
{
    fn should_record(&self, kind: AccessKind, thread_id: ThreadId) -> bool {
        (self.0)(kind, thread_id)
    }
}

/// Records everything
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordAll;

impl AccessPolicy for RecordAll {
    fn should_record(&self, _kind: AccessKind, _thread_id: ThreadId) -> bool {
        true
    }
}

/// Thread-id based selection: writes from an allow-set, reads from all
/// threads except a skip-set.
///
/// The default sets (writes from threads 1 and 2, reads from everything
/// but thread 0) match the historical trace logs; swap them out when the
/// asymmetry is not wanted.
#[derive(Debug, Clone)]
pub struct ThreadSelectPolicy {
    write_threads: HashSet<ThreadId>,
    skip_read_threads: HashSet<ThreadId>,
}

impl ThreadSelectPolicy {
    /// Create a policy recording writes from `write_threads` and reads
    /// from every thread not in `skip_read_threads`.
    pub fn new(
        write_threads: impl IntoIterator<Item = ThreadId>,
        skip_read_threads: impl IntoIterator<Item = ThreadId>,
    ) -> Self {
        Self {
            write_threads: write_threads.into_iter().collect(),
            skip_read_threads: skip_read_threads.into_iter().collect(),
        }
    }
}

impl Default for ThreadSelectPolicy {
    fn default() -> Self {
        Self::new([1, 2], [0])
    }
}

impl AccessPolicy for ThreadSelectPolicy {
    fn should_record(&self, kind: AccessKind, thread_id: ThreadId) -> bool {
        match kind {
            AccessKind::Write => self.write_threads.contains(&thread_id),
            AccessKind::Read => !self.skip_read_threads.contains(&thread_id),
        }
    }
}

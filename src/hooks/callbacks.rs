// src/hooks/callbacks.rs
//! Engine-facing hook surface
//!
//! The instrumentation engine drives exactly four entry points, all
//! synchronous on whichever target thread triggered them:
//!
//! - `on_thread_begin` / `on_thread_end` — once per thread, begin before
//!   end for a given id, no cross-thread ordering
//! - `on_memory_access` — once per qualifying memory operand,
//!   pre-execution; predicated-out operands never reach this call
//! - `on_program_exit` — exactly once after target exit, before teardown
//!
//! `TracerHooks` is an explicit, process-scoped context object. Engines
//! whose callback ABI is free functions can pin one instance through
//! [`global`].

use crate::hooks::thread_registry::ThreadRegistry;
use crate::recording::event::{MemoryAccess, ThreadId};
use crate::recording::filter::{AccessPolicy, RecordAll, ThreadSelectPolicy};
use crate::recording::recorder::{RecorderConfig, TraceRecorder};
use crate::recording::sink::TraceSink;
use crate::utils::config::TracerConfig;
use crate::utils::errors::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// The hook surface handed to the instrumentation engine.
pub struct TracerHooks {
    recorder: Arc<TraceRecorder>,
    registry: ThreadRegistry,
}

impl TracerHooks {
    /// Build the hook surface around an existing recorder.
    pub fn new(recorder: Arc<TraceRecorder>) -> Self {
        Self {
            recorder,
            registry: ThreadRegistry::new(),
        }
    }

    /// Build everything from configuration: open the sink at the
    /// configured path (fatal on failure), select the filter policy, and
    /// wire up the recorder.
    pub fn from_config(config: &TracerConfig) -> Result<Self> {
        let sink = TraceSink::create(&config.output.path)?;

        let policy: Arc<dyn AccessPolicy> = if config.filter.record_all {
            Arc::new(RecordAll)
        } else {
            Arc::new(ThreadSelectPolicy::new(
                config.filter.write_threads.iter().copied(),
                config.filter.skip_read_threads.iter().copied(),
            ))
        };

        let recorder = TraceRecorder::new(
            sink,
            policy,
            RecorderConfig {
                format: config.output.format,
                buffer_enabled: config.buffer.enabled,
                buffer_capacity: config.buffer.capacity,
                overflow: config.buffer.overflow,
            },
        );

        info!(
            "Tracer ready: output {}, format {:?}, buffer {}",
            config.output.path.display(),
            config.output.format,
            if config.buffer.enabled { "enabled" } else { "disabled" }
        );

        Ok(Self::new(Arc::new(recorder)))
    }

    /// Called by the engine when a target thread is created.
    pub fn on_thread_begin(&self, thread_id: ThreadId) -> Result<()> {
        self.registry.register_begin(thread_id);
        self.recorder.thread_begin(thread_id)
    }

    /// Called by the engine when a target thread terminates.
    pub fn on_thread_end(&self, thread_id: ThreadId, exit_code: i32) -> Result<()> {
        self.registry.register_end(thread_id, exit_code);
        self.recorder.thread_end(thread_id, exit_code)
    }

    /// Called by the engine for each memory operand, pre-execution.
    pub fn on_memory_access(&self, access: MemoryAccess) -> Result<()> {
        self.recorder.record_access(access)
    }

    /// Called by the engine exactly once after the target program exits.
    /// Finalizes the sink; no events are accepted afterwards.
    pub fn on_program_exit(&self) -> Result<()> {
        let live = self.registry.live_count();
        if live > 0 {
            warn!(live_threads = live, "program exit with threads still live");
        }
        self.recorder.finalize()
    }

    /// The recorder behind this hook surface
    pub fn recorder(&self) -> &Arc<TraceRecorder> {
        &self.recorder
    }

    /// The lifecycle registry behind this hook surface
    pub fn registry(&self) -> &ThreadRegistry {
        &self.registry
    }
}

/// Process-global installation point, for engines whose callback ABI is
/// free functions rather than a context handle. The hooks object itself
/// stays explicit and testable; this module only pins one instance for
/// the lifetime of the process.
pub mod global {
    use super::TracerHooks;
    use crate::utils::errors::{Result, TraceError};
    use once_cell::sync::OnceCell;

    static HOOKS: OnceCell<TracerHooks> = OnceCell::new();

    /// Install the process-wide hook surface. Fails if one is already
    /// installed.
    pub fn install(hooks: TracerHooks) -> Result<()> {
        HOOKS
            .set(hooks)
            .map_err(|_| TraceError::ConfigFailed("tracer hooks already installed".to_string()))
    }

    /// The installed hook surface, if any.
    pub fn installed() -> Option<&'static TracerHooks> {
        HOOKS.get()
    }
}

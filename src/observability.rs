// src/observability.rs
//! Diagnostic logging
//!
//! Diagnostics (startup, anomalies, final stats) go to stderr through
//! `tracing`; the trace sink carries event lines only and is never used
//! for diagnostics.

use crate::recording::recorder::RecorderStats;
use crate::utils::errors::{Result, TraceError};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber. `RUST_LOG` controls verbosity;
/// defaults to `info`.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| TraceError::ConfigFailed(format!("failed to initialize tracing: {e}")))?;

    Ok(())
}

/// Log a run summary from the recorder's counters.
pub fn log_recorder_stats(stats: &RecorderStats) {
    info!(
        events_recorded = stats.events_recorded,
        events_filtered = stats.events_filtered,
        lifecycle_events = stats.lifecycle_events,
        lines_written = stats.lines_written,
        bytes_written = stats.bytes_written,
        buffer_appended = stats.buffer_appended,
        buffer_dropped = stats.buffer_dropped,
        "trace run summary"
    );
}

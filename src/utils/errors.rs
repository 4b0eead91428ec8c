// src/utils/errors.rs
//! Error types for the tracing runtime
//!
//! Every fatal condition aborts tracing for the whole process: there is no
//! per-event retry and no partial-degradation mode. Filtered events are not
//! errors and never surface here.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, TraceError>;

/// Tracer errors
#[derive(Error, Debug)]
pub enum TraceError {
    /// The trace sink could not be written or opened
    #[error("trace sink failed: {0}")]
    SinkFailed(String),

    /// A write or close was attempted after the sink was finalized
    #[error("trace sink is closed")]
    SinkClosed,

    /// The access buffer refused an append at capacity
    #[error("access buffer full (capacity {capacity})")]
    BufferFull { capacity: usize },

    /// Configuration could not be loaded or deserialized
    #[error("configuration error: {0}")]
    ConfigFailed(String),

    /// A snapshot export failed to serialize
    #[error("export failed: {0}")]
    ExportFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TraceError::BufferFull { capacity: 2000 };
        assert_eq!(err.to_string(), "access buffer full (capacity 2000)");

        let err = TraceError::SinkClosed;
        assert_eq!(err.to_string(), "trace sink is closed");
    }
}

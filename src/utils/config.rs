// src/utils/config.rs
//! Tracer configuration
//!
//! Layered: built-in defaults, overridden by an optional `memtrace.toml`
//! in the working directory, overridden by `MEMTRACE_*` environment
//! variables (e.g. `MEMTRACE_OUTPUT__PATH=/tmp/trace.log`).

use crate::recording::buffer::{OverflowPolicy, DEFAULT_CAPACITY};
use crate::recording::event::{ThreadId, TraceFormat};
use crate::utils::errors::{Result, TraceError};
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level tracer configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    /// Output sink settings
    pub output: OutputConfig,

    /// In-memory access buffer settings
    pub buffer: BufferConfig,

    /// Access filter settings
    pub filter: FilterConfig,
}

/// Output sink settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Trace log destination; failure to open is fatal at startup
    pub path: PathBuf,

    /// Line format of the log
    pub format: TraceFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("memory_access.log"),
            format: TraceFormat::Compact,
        }
    }
}

/// In-memory access buffer settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Mirror recorded reads into the buffer
    pub enabled: bool,

    /// Slot capacity
    pub capacity: usize,

    /// Behavior at capacity
    pub overflow: OverflowPolicy,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            capacity: DEFAULT_CAPACITY,
            overflow: OverflowPolicy::Reject,
        }
    }
}

/// Access filter settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Record every access, ignoring the thread sets below
    pub record_all: bool,

    /// Threads whose writes are recorded
    pub write_threads: Vec<ThreadId>,

    /// Threads whose reads are skipped
    pub skip_read_threads: Vec<ThreadId>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            record_all: false,
            write_threads: vec![1, 2], // historical default
            skip_read_threads: vec![0],
        }
    }
}

impl TracerConfig {
    /// Load configuration from defaults, file, and environment.
    pub fn load() -> Result<Self> {
        Self::load_from("memtrace")
    }

    /// Load with an explicit file stem (tests use a scratch name).
    pub fn load_from(file_stem: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(file_stem).required(false))
            .add_source(config::Environment::with_prefix("MEMTRACE").separator("__"))
            .build()
            .map_err(|e| TraceError::ConfigFailed(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| TraceError::ConfigFailed(e.to_string()))
    }
}

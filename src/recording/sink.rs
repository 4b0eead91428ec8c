// src/recording/sink.rs
//! Durable line-oriented trace sink
//!
//! Owns the output stream for the whole run: opened once at startup,
//! written under the recorder's lock, closed exactly once at finalize.
//! Every line is flushed before the write returns, so a trace truncated by
//! an abnormal target-program exit is still readable up to the last
//! admitted event.

use crate::utils::errors::{Result, TraceError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Line-oriented durable event sink.
///
/// State machine: `Open` on construction, `Closed` after [`close`]
/// succeeds. Writes and a second close are rejected with
/// [`TraceError::SinkClosed`] once closed.
///
/// [`close`]: TraceSink::close
pub struct TraceSink {
    writer: Option<BufWriter<Box<dyn Write + Send>>>,
    lines_written: u64,
    bytes_written: u64,
}

impl TraceSink {
    /// Open a sink at `path`, creating or truncating the file.
    ///
    /// Failure here is fatal at startup: tracing cannot begin without a
    /// destination.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            TraceError::SinkFailed(format!("failed to open {}: {}", path.display(), e))
        })?;

        debug!("Opened trace sink at {}", path.display());

        Ok(Self::from_writer(Box::new(file)))
    }

    /// Wrap an arbitrary writer. Used by tests and embedders that manage
    /// their own stream.
    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Some(BufWriter::new(writer)),
            lines_written: 0,
            bytes_written: 0,
        }
    }

    /// Append one event line and flush it to the underlying stream.
    ///
    /// The caller holds the recorder lock, so a completed `write_line` is
    /// never interleaved with another writer's bytes.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(TraceError::SinkClosed)?;

        writeln!(writer, "{line}")
            .map_err(|e| TraceError::SinkFailed(format!("write failed: {e}")))?;
        writer
            .flush()
            .map_err(|e| TraceError::SinkFailed(format!("flush failed: {e}")))?;

        self.lines_written += 1;
        self.bytes_written += line.len() as u64 + 1;

        Ok(())
    }

    /// Finalize the sink, writing `end_marker` first when one is given.
    ///
    /// Valid exactly once; a second close is a programming error and
    /// returns [`TraceError::SinkClosed`].
    pub fn close(&mut self, end_marker: Option<&str>) -> Result<()> {
        if let Some(marker) = end_marker {
            self.write_line(marker)?;
        }

        let mut writer = self.writer.take().ok_or(TraceError::SinkClosed)?;
        writer
            .flush()
            .map_err(|e| TraceError::SinkFailed(format!("flush on close failed: {e}")))?;

        debug!(
            "Closed trace sink after {} lines ({} bytes)",
            self.lines_written, self.bytes_written
        );

        Ok(())
    }

    /// Whether the sink still accepts writes
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Total lines written so far
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Total bytes written so far, including newlines
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl Drop for TraceSink {
    fn drop(&mut self) {
        // Flush whatever made it in if the sink was never finalized
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sink_creation() {
        let file = NamedTempFile::new().unwrap();
        let sink = TraceSink::create(file.path());
        assert!(sink.is_ok());

        let sink = sink.unwrap();
        assert!(sink.is_open());
        assert_eq!(sink.lines_written(), 0);
    }

    #[test]
    fn test_create_fails_on_bad_path() {
        let result = TraceSink::create("/nonexistent-dir/trace.log");
        assert!(matches!(result, Err(TraceError::SinkFailed(_))));
    }

    #[test]
    fn test_write_lines() {
        let file = NamedTempFile::new().unwrap();
        let mut sink = TraceSink::create(file.path()).unwrap();

        sink.write_line("thread begin 0").unwrap();
        sink.write_line("thread end 0, code 0").unwrap();
        sink.close(None).unwrap();

        let contents = fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents, "thread begin 0\nthread end 0, code 0\n");
        assert_eq!(sink.lines_written(), 2);
    }

    #[test]
    fn test_close_writes_end_marker() {
        let file = NamedTempFile::new().unwrap();
        let mut sink = TraceSink::create(file.path()).unwrap();

        sink.write_line("thread begin 0").unwrap();
        sink.close(Some("#eof")).unwrap();

        let contents = fs::read_to_string(file.path()).unwrap();
        assert!(contents.ends_with("#eof\n"));
    }

    #[test]
    fn test_write_after_close_rejected() {
        let file = NamedTempFile::new().unwrap();
        let mut sink = TraceSink::create(file.path()).unwrap();

        sink.close(None).unwrap();
        assert!(!sink.is_open());

        let result = sink.write_line("thread begin 1");
        assert!(matches!(result, Err(TraceError::SinkClosed)));
    }

    #[test]
    fn test_double_close_rejected() {
        let file = NamedTempFile::new().unwrap();
        let mut sink = TraceSink::create(file.path()).unwrap();

        sink.close(None).unwrap();
        let result = sink.close(None);
        assert!(matches!(result, Err(TraceError::SinkClosed)));
    }

    #[test]
    fn test_flush_per_write_visible_before_close() {
        let file = NamedTempFile::new().unwrap();
        let mut sink = TraceSink::create(file.path()).unwrap();

        sink.write_line("thread begin 0").unwrap();

        // Readable without closing: the write already hit the file
        let contents = fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents, "thread begin 0\n");
    }
}

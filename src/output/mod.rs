mod file_sink;

pub use file_sink::FileSink;

use anyhow::Result;

/// Trait for destinations of composited results
pub trait ResultSink {
    /// Write one encoded result
    fn write_result(&mut self, encoded: &[u8]) -> Result<()>;

    /// Human-readable destination for logs
    fn describe(&self) -> String;
}

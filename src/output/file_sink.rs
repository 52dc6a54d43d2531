use super::ResultSink;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

/// Writes results to a file, or to stdout when the path is `-`
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn is_stdout(&self) -> bool {
        self.path.as_os_str() == "-"
    }
}

impl ResultSink for FileSink {
    fn write_result(&mut self, encoded: &[u8]) -> Result<()> {
        if self.is_stdout() {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(encoded)
                .context("Failed to write result to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        std::fs::write(&self.path, encoded)
            .with_context(|| format!("Failed to write result to {}", self.path.display()))
    }

    fn describe(&self) -> String {
        if self.is_stdout() {
            "stdout".to_string()
        } else {
            self.path.display().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_into_new_directory() {
        let dir = std::env::temp_dir().join(format!("framecut-sink-{}", std::process::id()));
        let path = dir.join("nested").join("result.png");

        let mut sink = FileSink::new(&path);
        sink.write_result(b"png bytes").unwrap();
        let written = std::fs::read(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(written, b"png bytes");
    }

    #[test]
    fn dash_means_stdout() {
        assert_eq!(FileSink::new("-").describe(), "stdout");
    }
}

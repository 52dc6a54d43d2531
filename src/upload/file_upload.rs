use super::UploadSource;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::PathBuf;

/// Reads an upload from a file, or from stdin when the path is `-`
pub struct FileUpload {
    path: PathBuf,
}

impl FileUpload {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn is_stdin(&self) -> bool {
        self.path.as_os_str() == "-"
    }
}

impl UploadSource for FileUpload {
    fn read_upload(&mut self) -> Result<Vec<u8>> {
        if self.is_stdin() {
            let mut bytes = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut bytes)
                .context("Failed to read upload from stdin")?;
            return Ok(bytes);
        }

        std::fs::read(&self.path)
            .with_context(|| format!("Failed to read upload from {}", self.path.display()))
    }

    fn describe(&self) -> String {
        if self.is_stdin() {
            "stdin".to_string()
        } else {
            self.path.display().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_file_contents() {
        let path = std::env::temp_dir().join(format!("framecut-upload-{}.bin", std::process::id()));
        std::fs::write(&path, b"payload").unwrap();

        let mut upload = FileUpload::new(&path);
        let bytes = upload.read_upload().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(bytes, b"payload");
        assert_eq!(upload.describe(), path.display().to_string());
    }

    #[test]
    fn missing_file_names_path() {
        let mut upload = FileUpload::new("no/such/upload.jpg");
        let err = upload.read_upload().unwrap_err();
        assert!(format!("{err:#}").contains("no/such/upload.jpg"));
    }

    #[test]
    fn dash_means_stdin() {
        assert_eq!(FileUpload::new("-").describe(), "stdin");
    }
}

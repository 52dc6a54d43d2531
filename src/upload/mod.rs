mod file_upload;

pub use file_upload::FileUpload;

use anyhow::Result;

/// Trait for sources of uploaded images
pub trait UploadSource {
    /// Read the complete encoded upload
    fn read_upload(&mut self) -> Result<Vec<u8>>;

    /// Human-readable origin for logs
    fn describe(&self) -> String;
}

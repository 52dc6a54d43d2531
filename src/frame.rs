use crate::codec;
use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// The decorative frame every upload is composited onto
///
/// Loaded once at startup and only borrowed afterwards; requests composite
/// onto their own copy of the pixels.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbaImage,
    path: PathBuf,
}

impl Frame {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Loading frame from {}", path.display());

        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read frame image at {}", path.display()))?;
        let decoded = codec::decode(&bytes)
            .with_context(|| format!("Failed to decode frame image at {}", path.display()))?;

        if !decoded.color().has_alpha() {
            tracing::warn!(
                "Frame {} has no alpha channel, treating it as fully opaque",
                path.display()
            );
        }

        Self::from_image(decoded.into_rgba8(), path)
    }

    pub fn from_image<P: Into<PathBuf>>(image: RgbaImage, path: P) -> Result<Self> {
        let path = path.into();
        let (width, height) = image.dimensions();
        anyhow::ensure!(
            width > 0 && height > 0,
            "Frame image at {} is empty ({}x{})",
            path.display(),
            width,
            height
        );

        Ok(Self { image, path })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn missing_frame_is_fatal() {
        let err = Frame::load("does/not/exist/frame.png").unwrap_err();
        assert!(err.to_string().contains("does/not/exist/frame.png"));
    }

    #[test]
    fn corrupt_frame_is_fatal() {
        let path = std::env::temp_dir().join(format!("framecut-corrupt-{}.png", std::process::id()));
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nnot really").unwrap();
        let result = Frame::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn loads_rgba_frame_from_disk() {
        let path = std::env::temp_dir().join(format!("framecut-frame-{}.png", std::process::id()));
        let image = RgbaImage::from_pixel(30, 20, Rgba([1, 2, 3, 128]));
        image.save(&path).unwrap();

        let frame = Frame::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(frame.dimensions(), (30, 20));
        assert_eq!(frame.image(), &image);
        assert_eq!(frame.path(), path.as_path());
    }

    #[test]
    fn empty_frame_is_rejected() {
        assert!(Frame::from_image(RgbaImage::new(0, 0), "empty.png").is_err());
    }

    #[test]
    fn frame_can_be_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Frame>();
    }
}

use thiserror::Error;

/// Failures from decoding or encoding raster data
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("corrupt image data: {0}")]
    CorruptData(String),

    #[error("failed to encode image: {0}")]
    Encode(String),
}

impl From<image::ImageError> for CodecError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(e) => Self::UnsupportedFormat(e.to_string()),
            image::ImageError::Encoding(e) => Self::Encode(e.to_string()),
            other => Self::CorruptData(other.to_string()),
        }
    }
}

/// Everything that can go wrong while turning one upload into a framed result
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no image uploaded")]
    EmptyUpload,

    #[error("invalid dimensions {width}x{height}: width and height must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("segmentation output has no alpha channel")]
    MissingAlphaChannel,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("segmentation failed: {0:#}")]
    Segmentation(anyhow::Error),
}

impl PipelineError {
    /// True when the failure was caused by the upload itself rather than processing
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::EmptyUpload | Self::InvalidDimensions { .. } => true,
            Self::Codec(CodecError::UnsupportedFormat(_) | CodecError::CorruptData(_)) => true,
            Self::Codec(CodecError::Encode(_))
            | Self::MissingAlphaChannel
            | Self::Segmentation(_) => false,
        }
    }
}

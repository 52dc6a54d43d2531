use crate::error::{CodecError, PipelineError};
use image::{imageops, DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

/// Resampling filters allowed for scaling photographic cutouts
///
/// Nearest-neighbour and box filters alias badly on downscaled photos,
/// so they are deliberately not offered here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resample {
    #[default]
    Lanczos3,
    CatmullRom,
}

impl Resample {
    fn filter_type(self) -> imageops::FilterType {
        match self {
            Self::Lanczos3 => imageops::FilterType::Lanczos3,
            Self::CatmullRom => imageops::FilterType::CatmullRom,
        }
    }
}

/// Decode any supported raster format into a dynamic image
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, CodecError> {
    let _span = tracing::debug_span!("decode", len = bytes.len()).entered();
    let image = image::load_from_memory(bytes)?;
    tracing::debug!(
        "Decoded {}x{} image ({:?})",
        image.width(),
        image.height(),
        image.color()
    );
    Ok(image)
}

/// Decode an image that must carry its own transparency
///
/// Images without an alpha channel are rejected instead of being widened
/// to fully opaque RGBA.
pub fn decode_with_alpha(bytes: &[u8]) -> Result<RgbaImage, PipelineError> {
    let image = decode(bytes)?;
    if !image.color().has_alpha() {
        return Err(PipelineError::MissingAlphaChannel);
    }
    Ok(image.into_rgba8())
}

/// Encode an RGBA buffer in the given format
pub fn encode(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, CodecError> {
    let _span = tracing::debug_span!("encode", ?format).entered();
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format)?;
    Ok(out.into_inner())
}

/// Lossless, alpha-preserving encoding used for results
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CodecError> {
    encode(image, ImageFormat::Png)
}

/// Resize an RGBA buffer, keeping partial alpha values intact
pub fn resize(image: &RgbaImage, width: u32, height: u32, filter: Resample) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, filter.filter_type())
}

/// Re-encode an arbitrary upload as PNG so the segmentation step sees one format
pub fn normalize_upload(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let image = decode(bytes)?;
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba};

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn garbage_is_unsupported_format() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedFormat(_)), "{err:?}");
    }

    #[test]
    fn truncated_png_is_corrupt() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, Rgba([1, 2, 3, 4])));
        let bytes = png_bytes(&image);
        let err = decode(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, CodecError::CorruptData(_)), "{err:?}");
    }

    #[test]
    fn rgb_image_is_missing_alpha() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([10, 20, 30])));
        let err = decode_with_alpha(&png_bytes(&image)).unwrap_err();
        assert!(matches!(err, PipelineError::MissingAlphaChannel));
    }

    #[test]
    fn png_keeps_partial_alpha() {
        let image = RgbaImage::from_fn(4, 4, |x, y| Rgba([200, 100, 50, (x * 60 + y) as u8]));
        let decoded = decode_with_alpha(&encode_png(&image).unwrap()).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn resize_does_not_binarize_alpha() {
        // Hard edge between transparent and opaque halves
        let image = RgbaImage::from_fn(64, 64, |x, _| {
            if x < 32 {
                Rgba([255, 255, 255, 0])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let resized = resize(&image, 16, 16, Resample::Lanczos3);
        assert_eq!(resized.dimensions(), (16, 16));

        let alphas: Vec<u8> = resized.pixels().map(|p| p[3]).collect();
        assert!(alphas.iter().any(|&a| a > 0 && a < 255));
    }

    #[test]
    fn resize_uniform_image_stays_uniform() {
        let image = RgbaImage::from_pixel(400, 800, Rgba([255, 0, 0, 255]));
        let resized = resize(&image, 250, 500, Resample::Lanczos3);
        assert!(resized.pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn catmull_rom_hits_requested_size() {
        let image = RgbaImage::from_pixel(30, 10, Rgba([0, 0, 0, 77]));
        let resized = resize(&image, 7, 3, Resample::CatmullRom);
        assert_eq!(resized.dimensions(), (7, 3));
        assert!(resized.pixels().all(|p| p[3] == 77));
    }

    #[test]
    fn normalize_upload_produces_png() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 3, Rgb([9, 9, 9])));
        let mut jpeg = Cursor::new(Vec::new());
        image.write_to(&mut jpeg, ImageFormat::Jpeg).unwrap();

        let png = normalize_upload(&jpeg.into_inner()).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
        assert_eq!(decode(&png).unwrap().width(), 5);
    }
}

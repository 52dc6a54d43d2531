use anyhow::{ensure, Result};
use image::{imageops, RgbImage, RgbaImage};
use ndarray::Array4;

/// Per-channel mean the salient-object models were trained with
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// Per-channel standard deviation the salient-object models were trained with
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Preprocessor for converting RGB images to model input tensors
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
}

impl Preprocessor {
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            target_width,
            target_height,
        }
    }

    /// Preprocess an RGB image into a normalized NCHW tensor
    ///
    /// Steps:
    /// 1. Resize to target dimensions
    /// 2. Scale to [0, 1], then standardize with the ImageNet mean/std
    /// 3. Transpose from HWC to NCHW format
    ///
    /// Returns: Array4<f32> with shape [1, 3, height, width]
    pub fn preprocess(&self, image: &RgbImage) -> Array4<f32> {
        let _span = tracing::debug_span!("preprocess").entered();

        let resized = if image.dimensions() != (self.target_width, self.target_height) {
            imageops::resize(
                image,
                self.target_width,
                self.target_height,
                imageops::FilterType::Lanczos3,
            )
        } else {
            image.clone()
        };

        let (width, height) = resized.dimensions();
        let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                let value = f32::from(pixel[c]) / 255.0;
                tensor[[0, c, y as usize, x as usize]] = (value - MEAN[c]) / STD[c];
            }
        }

        tensor
    }

    /// Stretch raw model output to span the full [0, 1] range
    ///
    /// A flat prediction (max == min) yields an all-zero matte.
    pub fn normalize_matte(raw: &[f32]) -> Vec<f32> {
        let (min, max) = raw
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;
        if !range.is_finite() || range <= f32::EPSILON {
            return vec![0.0; raw.len()];
        }
        raw.iter().map(|&v| (v - min) / range).collect()
    }

    /// Postprocess model output matte back to original frame dimensions
    ///
    /// # Arguments
    /// * `matte` - Flattened matte at model resolution
    /// * `matte_width` - Width of the matte
    /// * `matte_height` - Height of the matte
    /// * `target_width` - Desired output width
    /// * `target_height` - Desired output height
    ///
    /// Returns: Resized matte flattened in row-major order
    pub fn postprocess_matte(
        matte: &[f32],
        matte_width: u32,
        matte_height: u32,
        target_width: u32,
        target_height: u32,
    ) -> Result<Vec<f32>> {
        let _span = tracing::debug_span!("postprocess").entered();

        ensure!(
            matte.len() == (matte_width * matte_height) as usize,
            "Matte has {} values, expected {}x{}",
            matte.len(),
            matte_width,
            matte_height
        );

        if matte_width == target_width && matte_height == target_height {
            return Ok(matte.to_vec());
        }

        // Convert to grayscale image for resizing
        let gray_image = image::GrayImage::from_fn(matte_width, matte_height, |x, y| {
            let idx = (y * matte_width + x) as usize;
            let value = (matte[idx] * 255.0).round().clamp(0.0, 255.0) as u8;
            image::Luma([value])
        });

        let resized = imageops::resize(
            &gray_image,
            target_width,
            target_height,
            imageops::FilterType::Lanczos3,
        );

        Ok(resized.pixels().map(|p| f32::from(p[0]) / 255.0).collect())
    }

    /// Attach a matte to an RGB image as its alpha channel
    pub fn apply_matte(image: &RgbImage, matte: &[f32]) -> Result<RgbaImage> {
        let (width, height) = image.dimensions();
        ensure!(
            matte.len() == (width * height) as usize,
            "Matte has {} values, image is {}x{}",
            matte.len(),
            width,
            height
        );

        Ok(RgbaImage::from_fn(width, height, |x, y| {
            let pixel = image.get_pixel(x, y);
            let idx = (y * width + x) as usize;
            let alpha = (matte[idx] * 255.0).round().clamp(0.0, 255.0) as u8;
            image::Rgba([pixel[0], pixel[1], pixel[2], alpha])
        }))
    }
}

use crate::codec::{self, Resample};
use crate::error::PipelineError;
use image::{Rgba, RgbaImage};

/// Largest share of the frame width a foreground may cover, as a fraction
const MAX_WIDTH_SHARE: (u64, u64) = (3, 5);

/// Largest share of the frame height a foreground may cover, as a fraction
const MAX_HEIGHT_SHARE: (u64, u64) = (1, 2);

/// Where a scaled foreground lands inside the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    /// Compute the bottom-center placement of a `fg_w`x`fg_h` foreground
    ///
    /// The foreground is scaled by a single factor so that it fits within
    /// 60% of the frame width and 50% of the frame height, then centered
    /// horizontally with its bottom edge flush against the frame's.
    pub fn compute(frame: (u32, u32), foreground: (u32, u32)) -> Result<Self, PipelineError> {
        let (frame_w, frame_h) = frame;
        let (fg_w, fg_h) = foreground;
        check_dimensions(frame_w, frame_h)?;
        check_dimensions(fg_w, fg_h)?;

        let max_w = u64::from(frame_w) * MAX_WIDTH_SHARE.0 / MAX_WIDTH_SHARE.1;
        let max_h = u64::from(frame_h) * MAX_HEIGHT_SHARE.0 / MAX_HEIGHT_SHARE.1;
        let (fg_w, fg_h) = (u64::from(fg_w), u64::from(fg_h));

        // ratio = min(max_w / fg_w, max_h / fg_h), compared without division
        let (new_w, new_h) = if max_w * fg_h <= max_h * fg_w {
            (max_w, fg_h * max_w / fg_w)
        } else {
            (fg_w * max_h / fg_h, max_h)
        };

        // Both limits are fractions of the frame, so the clamped size still fits inside it
        let width = new_w.max(1) as u32;
        let height = new_h.max(1) as u32;

        Ok(Self {
            x: (frame_w - width) / 2,
            y: frame_h - height,
            width,
            height,
        })
    }

    fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), PipelineError> {
    if width == 0 || height == 0 {
        return Err(PipelineError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Composite `foreground` onto a copy of `frame` at the bottom-center placement
///
/// The returned buffer always has the frame's dimensions; `frame` itself is
/// left untouched.
pub fn composite(frame: &RgbaImage, foreground: &RgbaImage) -> Result<RgbaImage, PipelineError> {
    let _span = tracing::debug_span!("composite").entered();

    let placement = Placement::compute(frame.dimensions(), foreground.dimensions())?;
    tracing::debug!(
        "Placing {}x{} foreground as {}x{} at ({}, {})",
        foreground.width(),
        foreground.height(),
        placement.width,
        placement.height,
        placement.x,
        placement.y
    );

    let scaled = codec::resize(
        foreground,
        placement.width,
        placement.height,
        Resample::Lanczos3,
    );

    let mut out = frame.clone();
    for (dx, dy, src) in scaled.enumerate_pixels() {
        let dst = out.get_pixel_mut(placement.x + dx, placement.y + dy);
        *dst = blend_over(*dst, *src);
    }

    Ok(out)
}

/// Source-over blend of a straight-alpha `src` onto `dst`
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    match src[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }

    let alpha = f32::from(src[3]) / 255.0;
    let inv = 1.0 - alpha;
    let mix = |s: u8, d: u8| (f32::from(s) * alpha + f32::from(d) * inv).round().clamp(0.0, 255.0) as u8;

    Rgba([
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        (f32::from(src[3]) + f32::from(dst[3]) * inv).round().clamp(0.0, 255.0) as u8,
    ])
}

use crate::codec;
use crate::compositor;
use crate::error::PipelineError;
use crate::frame::Frame;
use crate::segmentation::SegmentationModel;
use std::time::{Duration, Instant};

/// Per-stage wall clock for one processed upload
#[derive(Debug, Default, Clone, Copy)]
pub struct StageTimings {
    pub decode: Duration,
    pub segment: Duration,
    pub composite: Duration,
    pub encode: Duration,
}

impl StageTimings {
    pub fn total(&self) -> Duration {
        self.decode + self.segment + self.composite + self.encode
    }
}

/// Output of one processed upload
#[derive(Debug)]
pub struct Processed {
    /// PNG-encoded composite, frame-sized
    pub png: Vec<u8>,
    /// Encoded segmentation output, exactly as the model returned it
    pub cutout: Vec<u8>,
    pub timings: StageTimings,
}

/// Turns uploads into framed composites
///
/// Borrows the shared frame; owns its segmentation model since inference
/// sessions are not shared between concurrent requests.
pub struct Pipeline<'a> {
    frame: &'a Frame,
    model: Box<dyn SegmentationModel>,
}

impl<'a> Pipeline<'a> {
    pub fn new(frame: &'a Frame, model: Box<dyn SegmentationModel>) -> Self {
        Self { frame, model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Process one upload: segment, composite onto the frame, encode as PNG
    pub fn process(&mut self, upload: &[u8]) -> Result<Processed, PipelineError> {
        let _span = tracing::debug_span!("process", model = self.model.name()).entered();
        let mut timings = StageTimings::default();

        if upload.is_empty() {
            return Err(PipelineError::EmptyUpload);
        }

        let start = Instant::now();
        let normalized = codec::normalize_upload(upload)?;
        timings.decode = start.elapsed();

        let start = Instant::now();
        let cutout = self
            .model
            .remove_background(&normalized)
            .map_err(PipelineError::Segmentation)?;
        let foreground = codec::decode_with_alpha(&cutout)?;
        timings.segment = start.elapsed();

        let start = Instant::now();
        let combined = compositor::composite(self.frame.image(), &foreground)?;
        timings.composite = start.elapsed();

        let start = Instant::now();
        let png = codec::encode_png(&combined)?;
        timings.encode = start.elapsed();

        tracing::debug!(
            "Composited {}x{} foreground onto {}x{} frame",
            foreground.width(),
            foreground.height(),
            combined.width(),
            combined.height()
        );

        Ok(Processed {
            png,
            cutout,
            timings,
        })
    }
}

use super::preprocess::Preprocessor;
use super::types::SegmentationModel;
use crate::codec;
use anyhow::{ensure, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::TensorRef;
use std::path::Path;

/// U²-Net salient object segmentation model
///
/// Stateless: every call runs one inference on one image. The predicted
/// saliency map becomes the alpha channel of the returned cutout.
pub struct U2NetMatting {
    session: Session,
    preprocessor: Preprocessor,
    width: u32,
    height: u32,
}

impl U2NetMatting {
    /// Create a new U²-Net model from an ONNX file
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    /// * `intra_threads` - Threads ONNX Runtime may use inside one operator
    ///
    /// # Default Configuration
    /// - Input size: 320x320, the resolution the published weights expect
    pub fn new<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Result<Self> {
        let path = model_path.as_ref();

        tracing::info!("Loading U2-Net model from {}", path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        tracing::info!("U2-Net model loaded successfully");

        let width = 320;
        let height = 320;

        Ok(Self {
            session,
            preprocessor: Preprocessor::new(width, height),
            width,
            height,
        })
    }
}

impl SegmentationModel for U2NetMatting {
    fn remove_background(&mut self, encoded: &[u8]) -> Result<Vec<u8>> {
        let _span = tracing::debug_span!("u2net_segment").entered();

        let source = codec::decode(encoded)
            .context("Failed to decode image for segmentation")?
            .into_rgb8();
        let (source_width, source_height) = source.dimensions();

        let input_tensor = self.preprocessor.preprocess(&source);

        let _infer_span = tracing::debug_span!("inference").entered();
        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input_tensor.view())?])
            .context("Failed to run inference")?;
        drop(_infer_span);

        // The first output (d0) is the fused saliency map, shape [1, 1, H, W]
        let prediction = outputs[0].try_extract_array::<f32>()?;
        let shape = prediction.shape().to_vec();
        ensure!(
            shape.len() == 4 && shape[0] == 1 && shape[1] == 1,
            "Unexpected saliency map shape {:?}",
            shape
        );
        let (matte_height, matte_width) = (shape[2] as u32, shape[3] as u32);

        let raw: Vec<f32> = prediction.iter().copied().collect();

        let matte = Preprocessor::normalize_matte(&raw);
        let matte = Preprocessor::postprocess_matte(
            &matte,
            matte_width,
            matte_height,
            source_width,
            source_height,
        )?;

        let cutout = Preprocessor::apply_matte(&source, &matte)?;
        tracing::debug!(
            "Cutout {}x{} from {}x{} model input",
            source_width,
            source_height,
            self.width,
            self.height
        );

        Ok(codec::encode_png(&cutout)?)
    }

    fn name(&self) -> &str {
        "u2net"
    }
}

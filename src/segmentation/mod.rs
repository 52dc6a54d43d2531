mod passthrough;
mod preprocess;
pub mod types;
mod u2net;

pub use passthrough::PassthroughModel;
pub use types::SegmentationModel;
pub use u2net::U2NetMatting;

use anyhow::Result;
use std::path::Path;

/// Create the default ONNX-backed segmentation model (U²-Net)
pub fn create_default_model<P: AsRef<Path>>(
    model_path: P,
    intra_threads: usize,
) -> Result<Box<dyn SegmentationModel>> {
    let model = U2NetMatting::new(model_path, intra_threads)?;
    Ok(Box::new(model))
}

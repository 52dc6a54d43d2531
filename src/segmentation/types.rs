use anyhow::Result;

/// Trait for background removal backends
/// Allows swapping between an ONNX model, a remote service, or a test double
///
/// The contract is bytes in, bytes out: any common raster format goes in and
/// an encoded image comes back with the background made transparent. Callers
/// check that the result actually carries an alpha channel.
pub trait SegmentationModel {
    /// Remove the background from an encoded image
    ///
    /// # Arguments
    /// * `encoded` - Encoded input image (PNG, JPEG, ...)
    ///
    /// # Returns
    /// * Encoded image with an alpha channel, same dimensions as the input
    fn remove_background(&mut self, encoded: &[u8]) -> Result<Vec<u8>>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

use super::types::SegmentationModel;
use anyhow::Result;

/// Hands uploads through unchanged, for inputs that are already cutouts
#[derive(Debug, Default)]
pub struct PassthroughModel;

impl SegmentationModel for PassthroughModel {
    fn remove_background(&mut self, encoded: &[u8]) -> Result<Vec<u8>> {
        Ok(encoded.to_vec())
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_input_bytes() {
        let mut model = PassthroughModel;
        assert_eq!(model.remove_background(b"abc").unwrap(), b"abc");
        assert_eq!(model.name(), "passthrough");
    }
}

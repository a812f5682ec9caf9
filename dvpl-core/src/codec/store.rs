use super::{BlockCompressor, CompressionType};
use crate::error::Result;

pub struct Store;

impl BlockCompressor for Store {
    fn kind(&self) -> CompressionType {
        CompressionType::None
    }

    fn compress(&self, src: &[u8]) -> Result<Vec<u8>> {
        Ok(src.to_vec())
    }

    fn decompress(&self, src: &[u8], _original_size: usize) -> Result<Vec<u8>> {
        Ok(src.to_vec())
    }
}

use super::{BlockCompressor, CompressionType};
use crate::error::{DvplError, Result};

/// Level passed to the HC encoder; 9 is liblz4's LZ4HC_CLEVEL_DEFAULT.
const HC_LEVEL: i32 = 9;

/// Raw LZ4 block (no frame, no size prefix). Both modes share one decoder.
pub struct Lz4Block {
    pub high: bool,
}

impl BlockCompressor for Lz4Block {
    fn kind(&self) -> CompressionType {
        if self.high {
            CompressionType::Lz4Hc
        } else {
            CompressionType::Lz4
        }
    }

    fn compress(&self, src: &[u8]) -> Result<Vec<u8>> {
        if self.high {
            lz4::block::compress(
                src,
                Some(lz4::block::CompressionMode::HIGHCOMPRESSION(HC_LEVEL)),
                false,
            )
            .map_err(|e| DvplError::Compress(e.to_string()))
        } else {
            Ok(lz4_flex::block::compress(src))
        }
    }

    fn decompress(&self, src: &[u8], original_size: usize) -> Result<Vec<u8>> {
        let out = lz4_flex::block::decompress(src, original_size)
            .map_err(|e| DvplError::Decompress(e.to_string()))?;
        if out.len() != original_size {
            return Err(DvplError::Decompress(format!(
                "expected {original_size} bytes, block produced {}",
                out.len()
            )));
        }
        Ok(out)
    }
}

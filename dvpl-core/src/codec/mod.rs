use crate::error::{DvplError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire code stored in the footer's `compression_type` field.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompressionType {
    None = 0,
    Lz4 = 1,
    Lz4Hc = 2,
    /// Reserved. Decodes, but no operation can produce or consume it.
    Rfc1951 = 3,
}

impl CompressionType {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(CompressionType::None),
            1 => Ok(CompressionType::Lz4),
            2 => Ok(CompressionType::Lz4Hc),
            3 => Ok(CompressionType::Rfc1951),
            other => Err(DvplError::UnknownCompressionType(other)),
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            CompressionType::None => "NONE",
            CompressionType::Lz4 => "LZ4",
            CompressionType::Lz4Hc => "LZ4_HC",
            CompressionType::Rfc1951 => "RFC1951",
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressionType {
    type Err = DvplError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "NONE" => Ok(CompressionType::None),
            "LZ4" => Ok(CompressionType::Lz4),
            "LZ4_HC" | "LZ4HC" => Ok(CompressionType::Lz4Hc),
            "RFC1951" => Ok(CompressionType::Rfc1951),
            _ => Err(DvplError::Config(format!("unknown compression type: {s}"))),
        }
    }
}

/// Whole-buffer compressor. Implementations never embed the original size in
/// their output; the footer carries it.
pub trait BlockCompressor: Send + Sync {
    fn kind(&self) -> CompressionType;
    fn compress(&self, src: &[u8]) -> Result<Vec<u8>>;
    fn decompress(&self, src: &[u8], original_size: usize) -> Result<Vec<u8>>;
}

pub mod lz4block;
pub mod store;

use lz4block::Lz4Block;
use store::Store;

static STORE: Store = Store;
static LZ4: Lz4Block = Lz4Block { high: false };
static LZ4_HC: Lz4Block = Lz4Block { high: true };

pub fn compressor_for(kind: CompressionType) -> Result<&'static dyn BlockCompressor> {
    match kind {
        CompressionType::None => Ok(&STORE),
        CompressionType::Lz4 => Ok(&LZ4),
        CompressionType::Lz4Hc => Ok(&LZ4_HC),
        CompressionType::Rfc1951 => Err(DvplError::UnsupportedCompression(kind)),
    }
}

/// Transform file content into the payload stored ahead of the footer.
pub fn compress(content: &[u8], kind: CompressionType) -> Result<Vec<u8>> {
    compressor_for(kind)?.compress(content)
}

/// Recover file content from a payload. `original_size` must be the footer's
/// `input_file_size`.
pub fn decompress(payload: &[u8], kind: CompressionType, original_size: usize) -> Result<Vec<u8>> {
    compressor_for(kind)?.decompress(payload, original_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(CompressionType::None.code(), 0);
        assert_eq!(CompressionType::Lz4.code(), 1);
        assert_eq!(CompressionType::Lz4Hc.code(), 2);
        assert_eq!(CompressionType::Rfc1951.code(), 3);
        assert!(matches!(
            CompressionType::from_code(4),
            Err(DvplError::UnknownCompressionType(4))
        ));
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("lz4-hc".parse::<CompressionType>().unwrap(), CompressionType::Lz4Hc);
        assert_eq!("LZ4_HC".parse::<CompressionType>().unwrap(), CompressionType::Lz4Hc);
        assert_eq!("none".parse::<CompressionType>().unwrap(), CompressionType::None);
        assert!("deflate".parse::<CompressionType>().is_err());
    }

    #[test]
    fn rfc1951_is_rejected_both_ways() {
        assert!(matches!(
            compress(b"abc", CompressionType::Rfc1951),
            Err(DvplError::UnsupportedCompression(CompressionType::Rfc1951))
        ));
        assert!(matches!(
            decompress(b"abc", CompressionType::Rfc1951, 3),
            Err(DvplError::UnsupportedCompression(_))
        ));
    }

    #[test]
    fn table_maps_each_type_to_its_compressor() {
        for kind in [CompressionType::None, CompressionType::Lz4, CompressionType::Lz4Hc] {
            assert_eq!(compressor_for(kind).unwrap().kind(), kind);
        }
    }

    #[test]
    fn lz4_variants_round_trip() {
        let data: Vec<u8> = b"dvpl block ".iter().copied().cycle().take(4096).collect();
        for kind in [CompressionType::None, CompressionType::Lz4, CompressionType::Lz4Hc] {
            let packed = compress(&data, kind).unwrap();
            if kind != CompressionType::None {
                assert!(packed.len() < data.len(), "{kind} did not shrink repetitive input");
            }
            assert_eq!(decompress(&packed, kind, data.len()).unwrap(), data);
        }
    }
}

use std::borrow::Cow;
use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use crate::codec::CompressionType;
use crate::error::{DvplError, Result};

pub const FOOTER_LEN: usize = 20;
pub const FOOTER_LABEL: [u8; 4] = *b"DVPL";
/// File extension (without the dot) that marks a container.
pub const CONTAINER_EXT: &str = "dvpl";

/// Trailing 20 bytes of a container:
/// `input_size:u32le | block_size:u32le | block_crc32:u32le | type:u32le | label[4]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContainerFooter {
    pub input_file_size: u32,
    pub compressed_block_size: u32,
    pub compressed_block_crc32: u32,
    pub compression_type: CompressionType,
    pub label: [u8; 4],
}

impl ContainerFooter {
    pub fn new(
        input_file_size: u32,
        compressed_block_size: u32,
        compressed_block_crc32: u32,
        compression_type: CompressionType,
    ) -> Self {
        Self {
            input_file_size,
            compressed_block_size,
            compressed_block_crc32,
            compression_type,
            label: FOOTER_LABEL,
        }
    }

    /// Footer describing `payload`, which was produced from `input_file_size`
    /// bytes of content.
    pub fn for_payload(
        input_file_size: u32,
        payload: &[u8],
        compression_type: CompressionType,
    ) -> Result<Self> {
        let block_size = u32::try_from(payload.len()).map_err(|_| {
            DvplError::MalformedContainer(format!(
                "payload of {} bytes does not fit the footer",
                payload.len()
            ))
        })?;
        Ok(Self::new(
            input_file_size,
            block_size,
            crc32fast::hash(payload),
            compression_type,
        ))
    }

    pub fn encode(&self) -> [u8; FOOTER_LEN] {
        encode(
            self.input_file_size,
            self.compressed_block_size,
            self.compressed_block_crc32,
            self.compression_type,
            self.label,
        )
    }

    /// Decode exactly 20 bytes. Neither the label value nor the CRC is checked.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != FOOTER_LEN {
            return Err(DvplError::MalformedContainer(format!(
                "footer must be {FOOTER_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let le32 = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };

        let compression_type = CompressionType::from_code(le32(12))?;
        let mut label = [0u8; 4];
        label.copy_from_slice(&bytes[16..20]);
        if std::str::from_utf8(&label).is_err() {
            return Err(DvplError::MalformedContainer(
                "footer label is not valid UTF-8".into(),
            ));
        }

        Ok(Self {
            input_file_size: le32(0),
            compressed_block_size: le32(4),
            compressed_block_crc32: le32(8),
            compression_type,
            label,
        })
    }

    pub fn read_from<R: Read>(mut r: R) -> Result<Self> {
        let mut buf = [0u8; FOOTER_LEN];
        r.read_exact(&mut buf)?;
        Self::decode(&buf)
    }

    pub fn label_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.label)
    }

    /// `|compressed / input * 100 - 100|`, rounded to two decimals.
    pub fn compression_ratio_percent(&self) -> Result<f64> {
        if self.input_file_size == 0 {
            return Err(DvplError::ZeroInputSize);
        }
        let pct = self.compressed_block_size as f64 / self.input_file_size as f64 * 100.0;
        Ok(((pct - 100.0).abs() * 100.0).round() / 100.0)
    }

    pub fn verify_crc(&self, payload: &[u8]) -> Result<()> {
        let actual = crc32fast::hash(payload);
        if actual != self.compressed_block_crc32 {
            return Err(DvplError::ChecksumMismatch {
                expected: self.compressed_block_crc32,
                actual,
            });
        }
        Ok(())
    }
}

impl fmt::Display for ContainerFooter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DVPL Footer metadata:")?;
        writeln!(f, "-|  Input file size: {} bytes", self.input_file_size)?;
        writeln!(
            f,
            "-|  Compressed block size: {} bytes",
            self.compressed_block_size
        )?;
        writeln!(f, "-|  Compressed block crc32: {:x}", self.compressed_block_crc32)?;
        writeln!(f, "-|  Compression type: {}", self.compression_type)?;
        writeln!(f, "-|  Footer label: {}", self.label_str())?;
        match self.compression_ratio_percent() {
            Ok(ratio) => writeln!(f, "-|  Compression: {ratio}%"),
            Err(_) => writeln!(f, "-|  Compression: n/a (empty input)"),
        }
    }
}

pub fn encode(
    input_file_size: u32,
    compressed_block_size: u32,
    compressed_block_crc32: u32,
    compression_type: CompressionType,
    label: [u8; 4],
) -> [u8; FOOTER_LEN] {
    let mut out = [0u8; FOOTER_LEN];
    out[0..4].copy_from_slice(&input_file_size.to_le_bytes());
    out[4..8].copy_from_slice(&compressed_block_size.to_le_bytes());
    out[8..12].copy_from_slice(&compressed_block_crc32.to_le_bytes());
    out[12..16].copy_from_slice(&compression_type.code().to_le_bytes());
    out[16..20].copy_from_slice(&label);
    out
}

/// Split a whole container into payload and decoded footer.
pub fn split_container(bytes: &[u8]) -> Result<(&[u8], ContainerFooter)> {
    if bytes.len() < FOOTER_LEN {
        return Err(DvplError::MalformedContainer(format!(
            "{} bytes is too small to hold a footer",
            bytes.len()
        )));
    }
    let (payload, tail) = bytes.split_at(bytes.len() - FOOTER_LEN);
    Ok((payload, ContainerFooter::decode(tail)?))
}

/// Locate the footer by reading the last 20 bytes of the file.
pub fn read_footer_at_eof<F: Read + Seek>(f: &mut F) -> Result<ContainerFooter> {
    let len = f.seek(SeekFrom::End(0))?;
    if len < FOOTER_LEN as u64 {
        return Err(DvplError::MalformedContainer(format!(
            "{len} bytes is too small to hold a footer"
        )));
    }
    f.seek(SeekFrom::End(-(FOOTER_LEN as i64)))?;
    ContainerFooter::read_from(f)
}

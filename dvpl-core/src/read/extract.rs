use std::fs;
use std::path::Path;

use crate::codec::{self, CompressionType};
use crate::container::footer::{ContainerFooter, split_container};
use crate::error::{DvplError, Result};
use crate::util::atomic::write_atomic;

/// Unpack one container into `dest`. The CRC is only checked when
/// `verify_crc` is set.
pub fn extract_file(src: &Path, dest: &Path, verify_crc: bool) -> Result<ContainerFooter> {
    let bytes = fs::read(src)?;
    let (payload, footer) = split_container(&bytes)?;
    if verify_crc {
        footer.verify_crc(payload)?;
    }

    if footer.compression_type == CompressionType::None {
        write_atomic(dest, &[payload])?;
    } else {
        let content = codec::decompress(
            payload,
            footer.compression_type,
            footer.input_file_size as usize,
        )?;
        write_atomic(dest, &[&content])?;
    }
    Ok(footer)
}

/// Check a container end to end without writing anything: block size, CRC,
/// and that the payload decodes to `input_file_size` bytes.
pub fn verify(src: &Path) -> Result<ContainerFooter> {
    let bytes = fs::read(src)?;
    let (payload, footer) = split_container(&bytes)?;

    if footer.compressed_block_size as usize != payload.len() {
        return Err(DvplError::MalformedContainer(format!(
            "footer block size {} but payload is {} bytes",
            footer.compressed_block_size,
            payload.len()
        )));
    }
    footer.verify_crc(payload)?;

    let produced = match footer.compression_type {
        CompressionType::None => payload.len(),
        kind => codec::decompress(payload, kind, footer.input_file_size as usize)?.len(),
    };
    if produced != footer.input_file_size as usize {
        return Err(DvplError::MalformedContainer(format!(
            "footer input size {} but payload holds {produced} bytes",
            footer.input_file_size
        )));
    }
    Ok(footer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::writer::pack_file;

    #[test]
    fn verify_accepts_packed_and_rejects_tampered() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("data.bin");
        let dest = dir.path().join("data.bin.dvpl");
        let data: Vec<u8> = (0..5000u32).map(|i| (i % 7) as u8).collect();
        fs::write(&src, &data).unwrap();
        pack_file(&src, &dest, CompressionType::Lz4).unwrap();

        verify(&dest).unwrap();

        let mut bytes = fs::read(&dest).unwrap();
        bytes[0] ^= 0xFF;
        fs::write(&dest, &bytes).unwrap();
        assert!(matches!(verify(&dest), Err(DvplError::ChecksumMismatch { .. })));
    }

    #[test]
    fn extract_honours_crc_flag() {
        let dir = tempfile::tempdir().unwrap();
        let container = dir.path().join("x.dvpl");
        let mut bytes = b"payload!".to_vec();
        bytes.extend_from_slice(&ContainerFooter::new(8, 8, 0, CompressionType::None).encode());
        fs::write(&container, &bytes).unwrap();

        let out = dir.path().join("x");
        extract_file(&container, &out, false).unwrap();
        assert_eq!(fs::read(&out).unwrap(), b"payload!");

        let out2 = dir.path().join("x2");
        assert!(matches!(
            extract_file(&container, &out2, true),
            Err(DvplError::ChecksumMismatch { .. })
        ));
        assert!(!out2.exists());
    }
}

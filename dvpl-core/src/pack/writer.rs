use std::fs;
use std::path::Path;

use crate::codec::{self, CompressionType};
use crate::container::footer::ContainerFooter;
use crate::error::{DvplError, Result};
use crate::util::atomic::write_atomic;

/// Pack one plain file into `dest` as `payload ++ footer`, replacing `dest`
/// if it exists.
pub fn pack_file(src: &Path, dest: &Path, kind: CompressionType) -> Result<ContainerFooter> {
    fit_u32(src, fs::metadata(src)?.len())?;
    let content = fs::read(src)?;
    let input_file_size = fit_u32(src, content.len() as u64)?;

    let payload = codec::compress(&content, kind)?;
    let footer = ContainerFooter::for_payload(input_file_size, &payload, kind)?;
    write_atomic(dest, &[&payload, &footer.encode()])?;
    Ok(footer)
}

/// The footer stores sizes as u32; larger inputs cannot be packed.
fn fit_u32(src: &Path, size: u64) -> Result<u32> {
    u32::try_from(size).map_err(|_| DvplError::FileTooLarge {
        path: src.to_path_buf(),
        size,
    })
}

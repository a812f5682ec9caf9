use std::io::Write;
use std::path::Path;

use crate::error::Result;

/// Write `parts` back to back into `dest` through a sibling temp file, then
/// rename over `dest`. A failed write leaves any existing `dest` untouched.
pub fn write_atomic(dest: &Path, parts: &[&[u8]]) -> Result<()> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".dvpl-")
        .suffix(".part")
        .tempfile_in(dir)?;
    for part in parts {
        tmp.write_all(part)?;
    }
    tmp.flush()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

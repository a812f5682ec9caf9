use std::fmt;
use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::codec::CompressionType;
use crate::container::footer::{ContainerFooter, read_footer_at_eof};
use crate::error::{DvplError, Result};
use crate::scan::is_container_path;

#[derive(Clone, Debug, Serialize)]
pub struct FileInfo {
    pub full_path: String,
    pub name: String,
    pub extension: String,
    pub size: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct FooterInfo {
    pub input_file_size: u32,
    pub compressed_block_size: u32,
    pub compressed_block_crc32: String,
    pub compression_type: CompressionType,
    pub label: String,
    pub compression_ratio_percent: Option<f64>,
}

impl From<&ContainerFooter> for FooterInfo {
    fn from(f: &ContainerFooter) -> Self {
        Self {
            input_file_size: f.input_file_size,
            compressed_block_size: f.compressed_block_size,
            compressed_block_crc32: format!("{:08x}", f.compressed_block_crc32),
            compression_type: f.compression_type,
            label: f.label_str().into_owned(),
            compression_ratio_percent: f.compression_ratio_percent().ok(),
        }
    }
}

/// File metadata, plus the decoded footer when the file is a container.
#[derive(Clone, Debug, Serialize)]
pub struct ContainerInfo {
    pub file: FileInfo,
    pub footer: Option<FooterInfo>,
    #[serde(skip)]
    raw_footer: Option<ContainerFooter>,
}

impl ContainerInfo {
    pub fn raw_footer(&self) -> Option<&ContainerFooter> {
        self.raw_footer.as_ref()
    }
}

impl fmt::Display for ContainerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Common File Info:")?;
        writeln!(f, "-|  Name: {}", self.file.name)?;
        writeln!(f, "-|  Extension: {}", self.file.extension)?;
        writeln!(f, "-|  Size: {} bytes", self.file.size)?;
        writeln!(f, "-|  Full path: {}", self.file.full_path)?;
        if let Some(footer) = &self.raw_footer {
            writeln!(f)?;
            write!(f, "{footer}")?;
        }
        Ok(())
    }
}

/// Read file metadata and, for `.dvpl` files, the footer. Only the last 20
/// bytes of a container are read.
pub fn inspect(path: &Path) -> Result<ContainerInfo> {
    if !path.exists() {
        return Err(DvplError::NotFound(path.to_path_buf()));
    }
    let meta = std::fs::metadata(path)?;
    let full = std::path::absolute(path)?;
    let file = FileInfo {
        full_path: full.display().to_string(),
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        extension: path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default(),
        size: meta.len(),
    };

    let raw_footer = if meta.is_file() && is_container_path(path) {
        let mut f = File::open(path)?;
        Some(read_footer_at_eof(&mut f)?)
    } else {
        None
    };

    Ok(ContainerInfo {
        file,
        footer: raw_footer.as_ref().map(FooterInfo::from),
        raw_footer,
    })
}

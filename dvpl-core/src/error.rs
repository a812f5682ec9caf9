use std::path::PathBuf;

use thiserror::Error;

use crate::codec::CompressionType;

#[derive(Error, Debug)]
pub enum DvplError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed container: {0}")]
    MalformedContainer(String),

    #[error("unknown compression type code: {0}")]
    UnknownCompressionType(u32),

    #[error("unsupported compression type: {0}")]
    UnsupportedCompression(CompressionType),

    #[error("CRC32 mismatch: footer says {expected:08x}, payload hashes to {actual:08x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("decompression failed: {0}")]
    Decompress(String),

    #[error("compression failed: {0}")]
    Compress(String),

    #[error("file too large for a 32-bit container: {path} ({size} bytes)")]
    FileTooLarge { path: PathBuf, size: u64 },

    #[error("compression ratio undefined: input file size is zero")]
    ZeroInputSize,

    #[error("not found: {0}")]
    NotFound(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid job target: {0}")]
    InvalidTarget(String),

    #[error("worker thread panicked")]
    WorkerPanicked,
}

impl DvplError {
    /// Errors caused by the content of one container; a batch skips the item.
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            DvplError::MalformedContainer(_)
                | DvplError::UnknownCompressionType(_)
                | DvplError::UnsupportedCompression(_)
                | DvplError::ChecksumMismatch { .. }
                | DvplError::Decompress(_)
                | DvplError::FileTooLarge { .. }
        )
    }

    /// Filesystem errors that the engine logs and moves past.
    pub fn is_transient(&self) -> bool {
        match self {
            DvplError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
            ),
            DvplError::NotFound(_) => true,
            _ => false,
        }
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, DvplError>;

use clap::{Parser, Subcommand, ValueEnum};
use dvpl_core::CompressionType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "DVPL container tool", long_about = None)]
pub struct Cli {
    /// Log per-item detail (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Compression choices offered for packing; the reserved RFC1951 code is not one.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Compression {
    None,
    Lz4,
    #[value(name = "lz4-hc")]
    Lz4Hc,
}

impl From<Compression> for CompressionType {
    fn from(c: Compression) -> Self {
        match c {
            Compression::None => CompressionType::None,
            Compression::Lz4 => CompressionType::Lz4,
            Compression::Lz4Hc => CompressionType::Lz4Hc,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack a file, or every plain file under a folder, into .dvpl containers
    Pack {
        path: PathBuf,

        /// Write containers under this folder instead of next to the sources
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Compression::Lz4Hc)]
        compression: Compression,

        /// Leave source files in place
        #[arg(long)]
        keep_originals: bool,

        /// Do not overwrite containers that already exist
        #[arg(long)]
        skip_existing: bool,

        /// Quiet per-file notices; report progress every 100 files
        #[arg(long)]
        fast: bool,

        #[arg(long)]
        json: bool,
    },

    /// Extract a .dvpl file, or every container under a folder
    Extract {
        path: PathBuf,

        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Leave containers in place
        #[arg(long)]
        keep_originals: bool,

        /// Do not overwrite files that already exist
        #[arg(long)]
        skip_existing: bool,

        #[arg(long)]
        fast: bool,

        /// Check each payload's CRC32 before writing
        #[arg(long)]
        verify: bool,

        #[arg(long)]
        json: bool,
    },

    /// Show file info, plus footer metadata for containers
    Info {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Count plain files, containers and folders under a directory
    Scan {
        dir: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Check block size, CRC32 and decoded length of a container (or a folder of them)
    Verify { path: PathBuf },
}

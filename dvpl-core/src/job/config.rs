use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::codec::CompressionType;
use crate::error::{DvplError, Result};

/// Options fixed for the lifetime of one job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Leave source files in place after conversion.
    pub keep_originals: bool,
    /// Treat an existing destination as done and leave it untouched.
    pub skip_if_exists: bool,
    /// Suppress per-item notices and sample progress every 100 items.
    pub fast_mode: bool,
    /// Required for pack, ignored by extract.
    pub compression_type: Option<CompressionType>,
    /// Compare payload CRC32 with the footer before extracting.
    #[serde(default)]
    pub verify_checksums: bool,
    /// Destination root; defaults to the job root.
    #[serde(default)]
    pub output_root: Option<PathBuf>,
}

impl JobConfig {
    pub fn builder() -> JobConfigBuilder {
        JobConfigBuilder::default()
    }
}

/// Collects options; `build` fails if any required flag was never set.
#[derive(Clone, Debug, Default)]
pub struct JobConfigBuilder {
    keep_originals: Option<bool>,
    skip_if_exists: Option<bool>,
    fast_mode: Option<bool>,
    compression_type: Option<CompressionType>,
    verify_checksums: bool,
    output_root: Option<PathBuf>,
}

impl JobConfigBuilder {
    pub fn keep_originals(mut self, v: bool) -> Self {
        self.keep_originals = Some(v);
        self
    }

    pub fn skip_if_exists(mut self, v: bool) -> Self {
        self.skip_if_exists = Some(v);
        self
    }

    pub fn fast_mode(mut self, v: bool) -> Self {
        self.fast_mode = Some(v);
        self
    }

    pub fn compression_type(mut self, v: CompressionType) -> Self {
        self.compression_type = Some(v);
        self
    }

    pub fn verify_checksums(mut self, v: bool) -> Self {
        self.verify_checksums = v;
        self
    }

    pub fn output_root(mut self, v: impl Into<PathBuf>) -> Self {
        self.output_root = Some(v.into());
        self
    }

    pub fn build(self) -> Result<JobConfig> {
        let missing = |name: &str| DvplError::Config(format!("{name} is not set"));
        Ok(JobConfig {
            keep_originals: self.keep_originals.ok_or_else(|| missing("keep_originals"))?,
            skip_if_exists: self.skip_if_exists.ok_or_else(|| missing("skip_if_exists"))?,
            fast_mode: self.fast_mode.ok_or_else(|| missing("fast_mode"))?,
            compression_type: self.compression_type,
            verify_checksums: self.verify_checksums,
            output_root: self.output_root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_required_flag_must_be_set() {
        let err = JobConfig::builder()
            .keep_originals(true)
            .fast_mode(false)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("skip_if_exists"));

        let cfg = JobConfig::builder()
            .keep_originals(true)
            .skip_if_exists(false)
            .fast_mode(false)
            .build()
            .unwrap();
        assert_eq!(cfg.compression_type, None);
        assert!(!cfg.verify_checksums);
        assert_eq!(cfg.output_root, None);
    }
}

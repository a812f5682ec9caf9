#![forbid(unsafe_code)]

pub mod error;

pub mod util {
    pub mod atomic;
}

pub mod codec;

pub mod container {
    pub mod footer;
}

pub mod scan;

pub mod pack {
    pub mod writer;
}

pub mod read {
    pub mod extract;
}

pub mod info;
pub mod job;

// Re-exports: stable API surface
pub use codec::CompressionType;
pub use container::footer::{ContainerFooter, FOOTER_LEN, FOOTER_LABEL};
pub use error::{DvplError, Result};
pub use info::{ContainerInfo, inspect};
pub use job::{
    Job, JobConfig, JobControl, JobEvent, JobHandle, JobKind, JobObserver, JobOutcome, JobReport,
    JobState, JobTarget,
};
pub use read::extract::verify;
pub use scan::{TreeClassification, TreeCounts, scan};

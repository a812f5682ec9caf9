//! Batch pack/extract over one file or a scanned tree.
//!
//! A [`Job`] is built once from a [`JobTarget`], a [`JobKind`] and a validated
//! [`JobConfig`], then consumed by [`Job::run`] (current thread) or
//! [`Job::spawn`] (dedicated worker thread). Items are processed one at a time
//! in scan order; the worker checks [`JobControl`] before every item.

pub mod config;
pub mod control;
pub mod events;
pub mod progress;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::codec::CompressionType;
use crate::container::footer::{CONTAINER_EXT, FOOTER_LEN};
use crate::error::{DvplError, Result};
use crate::pack::writer::pack_file;
use crate::read::extract::extract_file;
use crate::scan::{TreeClassification, is_container_path, scan};

pub use config::{JobConfig, JobConfigBuilder};
pub use control::{Checkpoint, JobControl};
pub use events::{
    ChannelObserver, JobEvent, JobObserver, JobOutcome, JobReport, Notice, NoticeKind,
    NullObserver,
};
use progress::ProgressSampler;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    Pack,
    Extract,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
    Completed,
    Canceled,
    Errored,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Canceled | JobState::Errored
        )
    }
}

/// What a job operates on, classified once up front.
#[derive(Clone, Debug)]
pub enum JobTarget {
    File { path: PathBuf, container: bool },
    Tree(TreeClassification),
}

impl JobTarget {
    /// Scan a directory, or classify a single file by its suffix.
    pub fn inspect(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Ok(JobTarget::Tree(scan(path)?));
        }
        if !path.is_file() {
            return Err(DvplError::NotFound(path.to_path_buf()));
        }
        Ok(JobTarget::File {
            path: path.to_path_buf(),
            container: is_container_path(path),
        })
    }

    /// Directory that destination paths are mirrored relative to.
    pub fn root(&self) -> PathBuf {
        match self {
            JobTarget::Tree(tree) => tree.root.clone(),
            JobTarget::File { path, .. } => match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }
}

enum ItemResult {
    Converted,
    Skipped,
}

pub struct Job {
    kind: JobKind,
    root: PathBuf,
    output_root: PathBuf,
    items: Vec<PathBuf>,
    single: bool,
    compression: CompressionType,
    config: JobConfig,
    control: JobControl,
    state: Arc<Mutex<JobState>>,
}

impl Job {
    pub fn new(target: JobTarget, kind: JobKind, config: JobConfig) -> Result<Self> {
        let compression = match (kind, config.compression_type) {
            (JobKind::Pack, None) => {
                return Err(DvplError::Config("compression_type is not set".into()));
            }
            (JobKind::Pack, Some(CompressionType::Rfc1951)) => {
                return Err(DvplError::UnsupportedCompression(CompressionType::Rfc1951));
            }
            (JobKind::Pack, Some(c)) => c,
            (JobKind::Extract, _) => CompressionType::None,
        };

        let root = target.root();
        let (items, single) = match target {
            JobTarget::File { path, container } => {
                match (kind, container) {
                    (JobKind::Extract, false) => {
                        return Err(DvplError::InvalidTarget(format!(
                            "not a .{CONTAINER_EXT} file: {}",
                            path.display()
                        )));
                    }
                    (JobKind::Pack, true) => {
                        return Err(DvplError::InvalidTarget(format!(
                            "already a .{CONTAINER_EXT} file: {}",
                            path.display()
                        )));
                    }
                    _ => {}
                }
                (vec![path], true)
            }
            JobTarget::Tree(tree) => match kind {
                JobKind::Extract => (tree.containers, false),
                JobKind::Pack => (tree.files, false),
            },
        };

        let output_root = config.output_root.clone().unwrap_or_else(|| root.clone());
        Ok(Self {
            kind,
            root,
            output_root,
            items,
            single,
            compression,
            config,
            control: JobControl::new(),
            state: Arc::new(Mutex::new(JobState::Idle)),
        })
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn items(&self) -> &[PathBuf] {
        &self.items
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Handle for pause/resume/cancel; valid before, during and after the run.
    pub fn control(&self) -> JobControl {
        self.control.clone()
    }

    pub fn state(&self) -> JobState {
        *self.state.lock()
    }

    /// Run on a dedicated worker thread.
    pub fn spawn<O>(self, observer: O) -> Result<JobHandle>
    where
        O: JobObserver + 'static,
    {
        let control = self.control.clone();
        let state = Arc::clone(&self.state);
        let thread = std::thread::Builder::new()
            .name("dvpl-worker".into())
            .spawn(move || self.run(&observer))?;
        Ok(JobHandle {
            control,
            state,
            thread,
        })
    }

    /// Run to a terminal state on the current thread.
    pub fn run(self, observer: &dyn JobObserver) -> JobOutcome {
        *self.state.lock() = JobState::Running;
        info!(
            kind = ?self.kind,
            root = %self.root.display(),
            items = self.items.len(),
            "job started"
        );

        let outcome = match self.drive(observer) {
            Ok(o) => o,
            Err(e) => {
                warn!(error = %e, "job errored");
                JobOutcome::Errored(e.to_string())
            }
        };

        *self.state.lock() = match &outcome {
            JobOutcome::Completed(_) => JobState::Completed,
            JobOutcome::Canceled(_) => JobState::Canceled,
            JobOutcome::Errored(_) => JobState::Errored,
        };
        self.control.mark_finished();
        info!(outcome = ?outcome, "job finished");
        observer.on_event(JobEvent::Finished(outcome.clone()));
        outcome
    }

    fn drive(&self, obs: &dyn JobObserver) -> Result<JobOutcome> {
        let total = self.items.len();
        let mut report = JobReport {
            total,
            ..Default::default()
        };
        let mut converted: Vec<&Path> = Vec::new();
        let mut progress = ProgressSampler::new(total, self.config.fast_mode);
        progress.start(obs);

        for (index, src) in self.items.iter().enumerate() {
            let checkpoint = self.control.checkpoint(
                || notify(obs, NoticeKind::Control, format!("paused before item {}", index + 1)),
                || notify(obs, NoticeKind::Control, "resumed".to_string()),
            );
            if checkpoint == Checkpoint::Canceled {
                notify(
                    obs,
                    NoticeKind::Control,
                    format!("canceled after {index} of {total} items"),
                );
                return Ok(JobOutcome::Canceled(report));
            }

            let result = match self.kind {
                JobKind::Extract => self.extract_one(src, obs),
                JobKind::Pack => self.pack_one(src, obs),
            };
            match result {
                Ok(ItemResult::Converted) => {
                    report.converted += 1;
                    converted.push(src.as_path());
                }
                Ok(ItemResult::Skipped) => report.skipped += 1,
                Err(e) if self.single && e.is_format() => return Err(e),
                Err(e) if e.is_format() || e.is_transient() => {
                    warn!(path = %src.display(), error = %e, "item failed");
                    report.failed += 1;
                    notify(obs, NoticeKind::Error, format!("{}: {e}", src.display()));
                }
                Err(e) => return Err(e),
            }

            let processed = index + 1;
            if progress.item_done(processed, obs) && self.config.fast_mode {
                let kind = self.notice_kind();
                notify(obs, kind, format!("processed {processed} of {total} files"));
            }
        }

        progress.finish(obs);
        report.deleted = self.clean_up(&converted, obs);
        Ok(JobOutcome::Completed(report))
    }

    fn extract_one(&self, src: &Path, obs: &dyn JobObserver) -> Result<ItemResult> {
        let name = src
            .file_stem()
            .ok_or_else(|| DvplError::InvalidTarget(format!("no file name: {}", src.display())))?
            .to_os_string();
        let dest = self.destination(src, name);

        if self.config.skip_if_exists && dest.exists() {
            self.note(obs, NoticeKind::Skip, format!("file already exists: {}", dest.display()));
            return Ok(ItemResult::Skipped);
        }
        if fs::metadata(src)?.len() < FOOTER_LEN as u64 {
            self.note(
                obs,
                NoticeKind::Skip,
                format!("file too small, skipping: {}", src.display()),
            );
            return Ok(ItemResult::Skipped);
        }

        ensure_parent(&dest)?;
        let footer = extract_file(src, &dest, self.config.verify_checksums)?;
        debug!(
            src = %src.display(),
            dest = %dest.display(),
            kind = %footer.compression_type,
            size = footer.input_file_size,
            "extracted"
        );
        self.note(
            obs,
            NoticeKind::Extract,
            format!("{} -> {}", src.display(), dest.display()),
        );
        Ok(ItemResult::Converted)
    }

    fn pack_one(&self, src: &Path, obs: &dyn JobObserver) -> Result<ItemResult> {
        let mut name = src
            .file_name()
            .ok_or_else(|| DvplError::InvalidTarget(format!("no file name: {}", src.display())))?
            .to_os_string();
        name.push(".");
        name.push(CONTAINER_EXT);
        let dest = self.destination(src, name);

        if self.config.skip_if_exists && dest.exists() {
            self.note(obs, NoticeKind::Skip, format!("file already exists: {}", dest.display()));
            return Ok(ItemResult::Skipped);
        }

        ensure_parent(&dest)?;
        let footer = pack_file(src, &dest, self.compression)?;
        debug!(
            src = %src.display(),
            dest = %dest.display(),
            kind = %footer.compression_type,
            input = footer.input_file_size,
            block = footer.compressed_block_size,
            "packed"
        );
        self.note(
            obs,
            NoticeKind::Pack,
            format!("{} -> {}", src.display(), dest.display()),
        );
        Ok(ItemResult::Converted)
    }

    /// Mirror `src`'s parent, relative to the job root, under the output root.
    fn destination(&self, src: &Path, name: OsString) -> PathBuf {
        let rel = src
            .parent()
            .and_then(|p| p.strip_prefix(&self.root).ok())
            .unwrap_or_else(|| Path::new(""));
        self.output_root.join(rel).join(name)
    }

    /// Delete converted sources unless originals are kept. Failures are
    /// reported and skipped. Returns how many files were removed.
    fn clean_up(&self, converted: &[&Path], obs: &dyn JobObserver) -> usize {
        if self.config.keep_originals {
            return 0;
        }
        notify(
            obs,
            NoticeKind::Cleanup,
            format!("removing {} original file(s)", converted.len()),
        );
        let mut deleted = 0;
        for src in converted {
            match fs::remove_file(src) {
                Ok(()) => {
                    deleted += 1;
                    self.note(obs, NoticeKind::Cleanup, format!("deleted {}", src.display()));
                }
                Err(e) => {
                    warn!(path = %src.display(), error = %e, "cleanup failed");
                    notify(
                        obs,
                        NoticeKind::Error,
                        format!("could not delete {}: {e}", src.display()),
                    );
                }
            }
        }
        notify(obs, NoticeKind::Cleanup, "cleanup completed".to_string());
        deleted
    }

    fn notice_kind(&self) -> NoticeKind {
        match self.kind {
            JobKind::Extract => NoticeKind::Extract,
            JobKind::Pack => NoticeKind::Pack,
        }
    }

    /// Per-item notice; silent in fast mode.
    fn note(&self, obs: &dyn JobObserver, kind: NoticeKind, message: String) {
        if !self.config.fast_mode {
            notify(obs, kind, message);
        }
    }
}

fn notify(obs: &dyn JobObserver, kind: NoticeKind, message: String) {
    obs.on_event(JobEvent::Notice(Notice { kind, message }));
}

fn ensure_parent(dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Controller side of a spawned job.
pub struct JobHandle {
    control: JobControl,
    state: Arc<Mutex<JobState>>,
    thread: JoinHandle<JobOutcome>,
}

impl JobHandle {
    pub fn pause(&self) {
        self.control.pause();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    pub fn cancel(&self) {
        self.control.cancel();
    }

    pub fn control(&self) -> JobControl {
        self.control.clone()
    }

    pub fn state(&self) -> JobState {
        *self.state.lock()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    pub fn join(self) -> Result<JobOutcome> {
        self.thread.join().map_err(|_| DvplError::WorkerPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> JobConfigBuilder {
        JobConfig::builder()
            .keep_originals(true)
            .skip_if_exists(false)
            .fast_mode(false)
    }

    #[test]
    fn pack_requires_compression_type() {
        let dir = tempfile::tempdir().unwrap();
        let target = JobTarget::inspect(dir.path()).unwrap();
        let err = Job::new(target, JobKind::Pack, cfg().build().unwrap()).err().unwrap();
        assert!(matches!(err, DvplError::Config(_)));
    }

    #[test]
    fn pack_rejects_reserved_type() {
        let dir = tempfile::tempdir().unwrap();
        let target = JobTarget::inspect(dir.path()).unwrap();
        let config = cfg().compression_type(CompressionType::Rfc1951).build().unwrap();
        assert!(matches!(
            Job::new(target, JobKind::Pack, config),
            Err(DvplError::UnsupportedCompression(_))
        ));
    }

    #[test]
    fn single_file_kind_must_match_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("a.txt");
        fs::write(&plain, b"x").unwrap();
        let target = JobTarget::inspect(&plain).unwrap();
        assert!(matches!(
            Job::new(target, JobKind::Extract, cfg().build().unwrap()),
            Err(DvplError::InvalidTarget(_))
        ));

        let container = dir.path().join("a.txt.dvpl");
        fs::write(&container, b"x").unwrap();
        let target = JobTarget::inspect(&container).unwrap();
        let config = cfg().compression_type(CompressionType::Lz4).build().unwrap();
        assert!(matches!(
            Job::new(target, JobKind::Pack, config),
            Err(DvplError::InvalidTarget(_))
        ));
    }

    #[test]
    fn inspect_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            JobTarget::inspect(&dir.path().join("gone")),
            Err(DvplError::NotFound(_))
        ));
    }

    #[test]
    fn destination_mirrors_relative_parent() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/b/c.txt.dvpl"), b"x").unwrap();
        let target = JobTarget::inspect(dir.path()).unwrap();
        let job = Job::new(
            target,
            JobKind::Extract,
            cfg().output_root(out.path()).build().unwrap(),
        )
        .unwrap();
        let src = &job.items()[0];
        let dest = job.destination(src, src.file_stem().unwrap().to_os_string());
        assert_eq!(dest, out.path().join("a/b/c.txt"));
    }

    #[test]
    fn state_moves_from_idle_to_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let target = JobTarget::inspect(dir.path()).unwrap();
        let job = Job::new(target, JobKind::Extract, cfg().build().unwrap()).unwrap();
        assert_eq!(job.kind(), JobKind::Extract);
        assert_eq!(job.config(), &cfg().build().unwrap());
        assert_eq!(job.state(), JobState::Idle);
        let state = Arc::clone(&job.state);
        let outcome = job.run(&NullObserver);
        assert_eq!(outcome, JobOutcome::Completed(JobReport::default()));
        assert_eq!(*state.lock(), JobState::Completed);
        assert!(state.lock().is_terminal());
    }
}

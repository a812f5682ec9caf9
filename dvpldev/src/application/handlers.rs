use std::path::{Path, PathBuf};

use dvpl_core::error::{DvplError, Result};
use dvpl_core::job::{JobConfig, JobEvent, JobOutcome};
use dvpl_core::{CompressionType, Job, JobKind, JobTarget, inspect, scan, verify};
use serde_json::json;
use tracing::{debug, error, info};

use super::ExitCode;

fn log_event(event: JobEvent) {
    match event {
        JobEvent::Progress { processed, total } => debug!(processed, total, "progress"),
        JobEvent::Notice(notice) => info!("{notice}"),
        JobEvent::Finished(_) => {}
    }
}

fn run_job(path: &Path, kind: JobKind, config: JobConfig, json: bool) -> Result<ExitCode> {
    let target = JobTarget::inspect(path)?;
    let job = Job::new(target, kind, config)?;
    let outcome = job.spawn(log_event)?.join()?;

    let (status, code) = match &outcome {
        JobOutcome::Completed(_) => ("completed", 0),
        JobOutcome::Canceled(_) => ("canceled", 0),
        JobOutcome::Errored(detail) => {
            error!("{detail}");
            ("errored", 1)
        }
    };

    if json {
        let body = match &outcome {
            JobOutcome::Errored(detail) => json!({ "status": status, "error": detail }),
            other => json!({ "status": status, "report": other.report() }),
        };
        println!("{}", to_json(&body)?);
    } else if let Some(r) = outcome.report() {
        println!(
            "{status}: {} total, {} converted, {} skipped, {} failed, {} deleted",
            r.total, r.converted, r.skipped, r.failed, r.deleted
        );
    } else {
        println!("{status}");
    }
    Ok(code)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| DvplError::Config(e.to_string()))
}

pub fn handle_pack(
    path: PathBuf,
    out: Option<PathBuf>,
    compression: CompressionType,
    keep_originals: bool,
    skip_existing: bool,
    fast: bool,
    json: bool,
) -> Result<ExitCode> {
    let mut builder = JobConfig::builder()
        .keep_originals(keep_originals)
        .skip_if_exists(skip_existing)
        .fast_mode(fast)
        .compression_type(compression);
    if let Some(out) = out {
        builder = builder.output_root(out);
    }
    run_job(&path, JobKind::Pack, builder.build()?, json)
}

pub fn handle_extract(
    path: PathBuf,
    out: Option<PathBuf>,
    keep_originals: bool,
    skip_existing: bool,
    fast: bool,
    verify_checksums: bool,
    json: bool,
) -> Result<ExitCode> {
    let mut builder = JobConfig::builder()
        .keep_originals(keep_originals)
        .skip_if_exists(skip_existing)
        .fast_mode(fast)
        .verify_checksums(verify_checksums);
    if let Some(out) = out {
        builder = builder.output_root(out);
    }
    run_job(&path, JobKind::Extract, builder.build()?, json)
}

pub fn handle_info(file: PathBuf, json: bool) -> Result<ExitCode> {
    let info = inspect(&file)?;
    if json {
        println!("{}", to_json(&info)?);
    } else {
        print!("{info}");
    }
    Ok(0)
}

pub fn handle_scan(dir: PathBuf, json: bool) -> Result<ExitCode> {
    let tree = scan(&dir)?;
    if json {
        let body = json!({
            "path": tree.root.display().to_string(),
            "counts": tree.counts(),
        });
        println!("{}", to_json(&body)?);
    } else {
        print!("{tree}");
    }
    Ok(0)
}

pub fn handle_verify(path: PathBuf) -> Result<ExitCode> {
    let containers = match JobTarget::inspect(&path)? {
        JobTarget::Tree(tree) => tree.containers,
        JobTarget::File { path, .. } => vec![path],
    };

    let mut failed = 0usize;
    for c in &containers {
        match verify(c) {
            Ok(footer) => println!("OK   {} ({})", c.display(), footer.compression_type),
            Err(e) => {
                failed += 1;
                println!("FAIL {}: {e}", c.display());
            }
        }
    }
    info!(checked = containers.len(), failed, "verify finished");
    Ok(if failed == 0 { 0 } else { 1 })
}

use std::fmt;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Skip,
    Extract,
    Pack,
    Cleanup,
    Control,
    Error,
}

impl NoticeKind {
    pub fn prefix(self) -> &'static str {
        match self {
            NoticeKind::Skip => "[skip]",
            NoticeKind::Extract => "[extract]",
            NoticeKind::Pack => "[pack]",
            NoticeKind::Cleanup => "[cleanup]",
            NoticeKind::Control => "[control]",
            NoticeKind::Error => "[error]",
        }
    }
}

/// One informational line for the host's log view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.prefix(), self.message)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub deleted: usize,
}

/// Terminal state, delivered exactly once per job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    Completed(JobReport),
    Canceled(JobReport),
    Errored(String),
}

impl JobOutcome {
    /// Only `Errored` counts as a failure; a cancel is a graceful stop.
    pub fn is_failure(&self) -> bool {
        matches!(self, JobOutcome::Errored(_))
    }

    pub fn report(&self) -> Option<&JobReport> {
        match self {
            JobOutcome::Completed(r) | JobOutcome::Canceled(r) => Some(r),
            JobOutcome::Errored(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobEvent {
    /// `total == 0` means there was nothing to do.
    Progress { processed: usize, total: usize },
    Notice(Notice),
    Finished(JobOutcome),
}

/// Receives job events on the worker thread, in order.
pub trait JobObserver: Send + Sync {
    fn on_event(&self, event: JobEvent);
}

impl<F> JobObserver for F
where
    F: Fn(JobEvent) + Send + Sync,
{
    fn on_event(&self, event: JobEvent) {
        self(event)
    }
}

/// Discards every event.
pub struct NullObserver;

impl JobObserver for NullObserver {
    fn on_event(&self, _event: JobEvent) {}
}

/// Forwards events into a channel; a dropped receiver is ignored.
pub struct ChannelObserver(pub crossbeam_channel::Sender<JobEvent>);

impl JobObserver for ChannelObserver {
    fn on_event(&self, event: JobEvent) {
        let _ = self.0.send(event);
    }
}

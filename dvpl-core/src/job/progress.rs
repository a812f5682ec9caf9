use super::events::{JobEvent, JobObserver};

/// Items between progress reports in fast mode.
pub const FAST_MODE_STRIDE: usize = 100;

/// Emits a strictly increasing `(processed, total)` sequence; fast mode keeps
/// only every `FAST_MODE_STRIDE`th value plus the final one.
pub(crate) struct ProgressSampler {
    total: usize,
    fast: bool,
    last: Option<usize>,
}

impl ProgressSampler {
    pub(crate) fn new(total: usize, fast: bool) -> Self {
        Self {
            total,
            fast,
            last: None,
        }
    }

    pub(crate) fn start(&mut self, obs: &dyn JobObserver) {
        self.emit(0, obs);
    }

    /// Returns true if a report was sent.
    pub(crate) fn item_done(&mut self, processed: usize, obs: &dyn JobObserver) -> bool {
        if self.fast && processed % FAST_MODE_STRIDE != 0 {
            return false;
        }
        self.emit(processed, obs);
        true
    }

    pub(crate) fn finish(&mut self, obs: &dyn JobObserver) {
        self.emit(self.total, obs);
    }

    fn emit(&mut self, processed: usize, obs: &dyn JobObserver) {
        if self.last.is_some_and(|last| last >= processed) {
            return;
        }
        self.last = Some(processed);
        obs.on_event(JobEvent::Progress {
            processed,
            total: self.total,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn collect(total: usize, fast: bool) -> Vec<usize> {
        let seen = Mutex::new(Vec::new());
        let obs = |e: JobEvent| {
            if let JobEvent::Progress { processed, .. } = e {
                seen.lock().push(processed);
            }
        };
        let mut s = ProgressSampler::new(total, fast);
        s.start(&obs);
        for i in 1..=total {
            s.item_done(i, &obs);
        }
        s.finish(&obs);
        seen.into_inner()
    }

    #[test]
    fn verbose_reports_every_item_once() {
        assert_eq!(collect(3, false), vec![0, 1, 2, 3]);
    }

    #[test]
    fn fast_mode_samples_and_closes() {
        assert_eq!(collect(250, true), vec![0, 100, 200, 250]);
        assert_eq!(collect(200, true), vec![0, 100, 200]);
    }

    #[test]
    fn empty_job_reports_once() {
        assert_eq!(collect(0, false), vec![0]);
    }
}

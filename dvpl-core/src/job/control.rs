use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Upper bound on one pause wait; the worker re-checks the flags after it.
const PAUSE_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    Proceed,
    Canceled,
}

#[derive(Default)]
struct Flags {
    paused: AtomicBool,
    canceled: AtomicBool,
    finished: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

/// Pause/cancel flags shared between the controller and the worker. This is
/// the only state either side mutates after the job starts.
#[derive(Clone, Default)]
pub struct JobControl {
    flags: Arc<Flags>,
}

impl JobControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        if self.is_finished() {
            return;
        }
        self.flags.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        if self.is_finished() {
            return;
        }
        self.flags.paused.store(false, Ordering::SeqCst);
        self.wake();
    }

    pub fn cancel(&self) {
        if self.is_finished() {
            return;
        }
        self.flags.canceled.store(true, Ordering::SeqCst);
        self.wake();
    }

    pub fn is_paused(&self) -> bool {
        self.flags.paused.load(Ordering::SeqCst)
    }

    pub fn is_canceled(&self) -> bool {
        self.flags.canceled.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.flags.finished.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_finished(&self) {
        self.flags.finished.store(true, Ordering::SeqCst);
        self.wake();
    }

    fn wake(&self) {
        let _g = self.flags.lock.lock();
        self.flags.wake.notify_all();
    }

    /// Worker side, called before each item. Blocks while paused; cancel
    /// wins over resume.
    pub(crate) fn checkpoint(
        &self,
        on_pause: impl FnOnce(),
        on_resume: impl FnOnce(),
    ) -> Checkpoint {
        if self.is_canceled() {
            return Checkpoint::Canceled;
        }
        if !self.is_paused() {
            return Checkpoint::Proceed;
        }

        on_pause();
        {
            let mut g = self.flags.lock.lock();
            while self.is_paused() && !self.is_canceled() {
                self.flags.wake.wait_for(&mut g, PAUSE_POLL);
            }
        }
        if self.is_canceled() {
            return Checkpoint::Canceled;
        }
        on_resume();
        Checkpoint::Proceed
    }
}

impl std::fmt::Debug for JobControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobControl")
            .field("paused", &self.is_paused())
            .field("canceled", &self.is_canceled())
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn idle_control_proceeds() {
        let c = JobControl::new();
        assert_eq!(
            c.checkpoint(|| panic!("paused"), || panic!("resumed")),
            Checkpoint::Proceed
        );
    }

    #[test]
    fn flags_are_idempotent() {
        let c = JobControl::new();
        c.pause();
        c.pause();
        assert!(c.is_paused());
        c.resume();
        c.resume();
        assert!(!c.is_paused());
        c.cancel();
        c.cancel();
        assert!(c.is_canceled());
    }

    #[test]
    fn calls_after_finish_are_ignored() {
        let c = JobControl::new();
        c.mark_finished();
        c.pause();
        c.cancel();
        assert!(!c.is_paused());
        assert!(!c.is_canceled());
    }

    #[test]
    fn pause_blocks_until_resume() {
        let c = JobControl::new();
        c.pause();
        let ctl = c.clone();
        let t = thread::spawn(move || {
            thread::sleep(Duration::from_millis(120));
            ctl.resume();
        });
        let start = Instant::now();
        let mut paused = false;
        let mut resumed = false;
        let cp = c.checkpoint(|| paused = true, || resumed = true);
        t.join().unwrap();
        assert_eq!(cp, Checkpoint::Proceed);
        assert!(paused && resumed);
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn cancel_during_pause_wins() {
        let c = JobControl::new();
        c.pause();
        let ctl = c.clone();
        let t = thread::spawn(move || {
            thread::sleep(Duration::from_millis(60));
            ctl.cancel();
        });
        let mut resumed = false;
        let cp = c.checkpoint(|| {}, || resumed = true);
        t.join().unwrap();
        assert_eq!(cp, Checkpoint::Canceled);
        assert!(!resumed);
    }
}

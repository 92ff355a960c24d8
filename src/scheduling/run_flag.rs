use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::Notify;

/// Process-wide "keep running" flag. Every background loop checks it between
/// iterations and sleeps through [`RunFlag::pause`] so that clearing it wakes them.
#[derive(Debug, Clone)]
pub struct RunFlag {
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl Default for RunFlag {
    fn default() -> Self { Self::new() }
}

impl RunFlag {
    pub fn new() -> Self {
        Self { running: Arc::new(AtomicBool::new(true)), wake: Arc::new(Notify::new()) }
    }

    pub fn is_running(&self) -> bool { self.running.load(Ordering::Acquire) }

    /// Clears the flag and wakes every paused loop. Idempotent.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        self.wake.notify_waiters();
    }

    /// Sleeps for `period` or until the flag is cleared.
    /// Returns whether the caller should keep running.
    pub async fn pause(&self, period: Duration) -> bool {
        let stopped = self.wake.notified();
        tokio::pin!(stopped);
        stopped.as_mut().enable();
        if !self.is_running() {
            return false;
        }
        tokio::select! {
            () = tokio::time::sleep(period) => self.is_running(),
            () = stopped => false,
        }
    }
}

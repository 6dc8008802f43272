//! Readiness Notifier

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::futures::Notified;
use tokio::sync::Notify;
use tracing::trace;

/// Wakes consumers blocked on (or polling for) buffered samples.
///
/// Consumers must call [`Notified::enable`] on the future returned by
/// [`ReadinessNotifier::listen`] *before* checking the buffer, so a wake-up
/// that races with the check is never lost.
#[derive(Debug, Default)]
pub struct ReadinessNotifier {
    notify: Notify,
    wakeups: AtomicU64,
}

impl ReadinessNotifier {
    /// Create a new notifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in the next wake-up
    pub fn listen(&self) -> Notified<'_> {
        self.notify.notified()
    }

    /// Wake every registered listener
    pub fn notify_all(&self) {
        let count = self.wakeups.fetch_add(1, Ordering::Relaxed) + 1;
        trace!("Readiness wake-up #{}", count);
        self.notify.notify_waiters();
    }

    /// Number of wake-ups signalled so far
    pub fn wakeups(&self) -> u64 {
        self.wakeups.load(Ordering::Relaxed)
    }
}

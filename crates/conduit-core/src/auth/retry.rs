//! Backoff schedule and timer bookkeeping for identity-check retries.

use std::time::Duration;

use tokio::task::JoinHandle;

/// Ceiling for the backoff delay.
const MAX_DELAY_SECS: u64 = 16;

/// Delay before retry number `attempt` (starting at 0).
///
/// min(2 · 2^attempt, 16) seconds: 2, 4, 8, 16, 16, 16, ...
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs((2_u64 << attempt.min(31)).min(MAX_DELAY_SECS))
}

/// Attempt counter plus the single pending retry timer, if any.
///
/// Exists meaningfully only while the session is `unavailable`; any
/// terminating transition resets it.
#[derive(Debug, Default)]
pub(crate) struct RetryContext {
    pub attempt: u32,
    pending: Option<JoinHandle<()>>,
}

impl RetryContext {
    /// Aborts the pending timer. Safe to call when none is pending.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Cancels the timer and resets the attempt counter.
    pub fn reset(&mut self) {
        self.cancel();
        self.attempt = 0;
    }

    /// Stores the newly scheduled timer. The caller cancels first, so at
    /// most one timer is ever pending.
    pub fn arm(&mut self, handle: JoinHandle<()>) {
        debug_assert!(self.pending.is_none());
        self.pending = Some(handle);
    }

    /// Removes the stored handle without aborting it. Used by the firing
    /// timer itself, so a later cancel cannot abort the check mid-flight.
    pub fn take_pending(&mut self) -> Option<JoinHandle<()>> {
        self.pending.take()
    }
}

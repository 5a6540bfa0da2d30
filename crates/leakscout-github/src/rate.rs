use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Snapshot of the upstream quota after a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateStatus {
    /// Requests remaining in the current window.
    pub remaining: i64,
    /// UTC epoch seconds when the window resets.
    pub reset_at: i64,
}

/// Replace-only tracker for the rate snapshot. Concurrent units overwrite
/// both fields on every response that carries rate headers; only the final
/// snapshot is surfaced to the caller, so a torn read of an intermediate
/// state is acceptable and no lock is taken.
#[derive(Debug)]
pub struct RateTracker {
    remaining: AtomicI64,
    reset_at: AtomicI64,
}

impl RateTracker {
    /// Starts from the unauthenticated GitHub ceiling with a reset one
    /// hour out, matching what the API would report for a fresh window.
    pub fn new() -> Self {
        Self {
            remaining: AtomicI64::new(5000),
            reset_at: AtomicI64::new(now_epoch() + 3600),
        }
    }

    pub fn replace(&self, status: RateStatus) {
        self.remaining.store(status.remaining, Ordering::Relaxed);
        self.reset_at.store(status.reset_at, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RateStatus {
        RateStatus {
            remaining: self.remaining.load(Ordering::Relaxed),
            reset_at: self.reset_at.load(Ordering::Relaxed),
        }
    }
}

impl Default for RateTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

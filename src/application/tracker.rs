//! Polls the network's observation endpoint for a submitted deposit and
//! folds the responses into a monotone pipeline report.

use crate::domain::pipeline::{StageProgress, TrackedDeposit, TrackingStatus};
use crate::domain::ports::ApiHandle;
use std::time::{Duration, SystemTime};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_MAX_ATTEMPTS: u32 = 200;

/// Timer-driven tracker for one deposit hash.
///
/// Polls are strictly sequential: the next request is only issued after the
/// previous one resolved and the interval elapsed, so a slow endpoint never
/// sees overlapping polls for the same hash. Dropping the tracker (or the
/// future returned by [`track_with`](Self::track_with)) cancels tracking;
/// nothing runs in the background.
pub struct DepositTracker {
    api: ApiHandle,
    snapshot: TrackedDeposit,
    poll_interval: Duration,
    max_attempts: u32,
}

impl DepositTracker {
    pub fn new(api: ApiHandle, hash: impl Into<String>) -> Self {
        Self {
            api,
            snapshot: TrackedDeposit::new(hash),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn latest(&self) -> &TrackedDeposit {
        &self.snapshot
    }

    /// One poll cycle: fetch, merge, update status, return the new snapshot.
    ///
    /// Transient transport/parse failures are logged and swallowed; the
    /// stage high-water mark means a sparse or failed poll never walks the
    /// report backwards.
    pub async fn poll_once(&mut self) -> TrackedDeposit {
        if self.snapshot.status.is_terminal() {
            return self.snapshot.clone();
        }
        self.snapshot.attempts += 1;
        self.snapshot.last_polled_at = Some(SystemTime::now());

        let polled = self.api.observed_tx(&self.snapshot.hash).await;
        match polled {
            Ok(Some(observation)) => {
                let seen = StageProgress::from_observation(&observation);
                self.snapshot.progress = self.snapshot.progress.merge(seen);
                if self.snapshot.progress.finalized {
                    self.snapshot.status = TrackingStatus::Completed;
                }
            }
            Ok(None) => {
                tracing::debug!(
                    target: "memoless",
                    hash = %self.snapshot.hash,
                    attempt = self.snapshot.attempts,
                    "deposit not observed yet"
                );
            }
            Err(err) if err.is_transient() => {
                tracing::warn!(
                    target: "memoless",
                    hash = %self.snapshot.hash,
                    attempt = self.snapshot.attempts,
                    error = %err,
                    "observation poll failed"
                );
            }
            Err(err) => {
                tracing::error!(
                    target: "memoless",
                    hash = %self.snapshot.hash,
                    error = %err,
                    "observation poll aborted"
                );
                self.snapshot.status = TrackingStatus::Error;
            }
        }

        if self.snapshot.status == TrackingStatus::Polling
            && self.snapshot.attempts >= self.max_attempts
        {
            self.snapshot.status = TrackingStatus::TimedOut;
        }
        self.snapshot.clone()
    }

    /// Poll at the fixed interval until terminal, handing every snapshot to
    /// `observer`. A `Completed` terminal snapshot is the caller's signal to
    /// refresh dependent state (balances live with an external collaborator).
    pub async fn track_with<F>(&mut self, mut observer: F) -> TrackedDeposit
    where
        F: FnMut(&TrackedDeposit),
    {
        loop {
            let snapshot = self.poll_once().await;
            observer(&snapshot);
            if snapshot.status.is_terminal() {
                return snapshot;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

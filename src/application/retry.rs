//! Structured retry for the network polling loops: bounded attempts, capped
//! exponential delay, optional total-elapsed budget. Dropping the returned
//! future cancels the loop.

use crate::error::{MemolessError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_elapsed: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            initial_delay: Duration::from_millis(1500),
            max_delay: Duration::from_secs(15),
            max_elapsed: Some(Duration::from_secs(120)),
        }
    }
}

impl RetryPolicy {
    /// Immediate-retry policy for tests.
    pub fn no_delay(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_elapsed: None,
        }
    }

    /// Drive `op` until it yields a value or the budget runs out.
    ///
    /// `Ok(Some(v))` completes the loop. `Ok(None)` (nothing on the server
    /// yet) and transient errors both count as a failed attempt and are only
    /// logged; a non-transient error aborts immediately. Exhausting the
    /// attempt or elapsed budget yields [`MemolessError::Timeout`].
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let started = Instant::now();
        let mut delay = self.initial_delay;
        let mut attempts = 0;
        while attempts < self.max_attempts {
            attempts += 1;
            match op().await {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {
                    tracing::debug!(target: "memoless", attempt = attempts, "{label}: not ready yet");
                }
                Err(err) if err.is_transient() => {
                    tracing::warn!(target: "memoless", attempt = attempts, error = %err, "{label}: transient failure");
                }
                Err(err) => return Err(err),
            }
            if let Some(budget) = self.max_elapsed
                && started.elapsed() >= budget
            {
                break;
            }
            if attempts < self.max_attempts {
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(self.max_delay);
            }
        }
        Err(MemolessError::Timeout { attempts })
    }
}

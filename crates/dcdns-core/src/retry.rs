//! Retry policy for discovery fetches
//!
//! Only address discovery retries; update submission is at-most-once and
//! never goes through this module. The policy is exponential: the delay
//! doubles after every failed attempt, starting from the configured
//! initial delay.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Exponential backoff retry policy
///
/// `max_attempts` counts the first try, so `max_attempts = 5` means one
/// initial attempt plus up to four retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    pub max_attempts: u32,

    /// Delay before the first retry; doubles for each retry after that
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy from attempt count and initial delay
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
        }
    }

    /// Delay to sleep after the attempt with the given zero-based index
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay * 2u32.saturating_pow(attempt)
    }

    /// Run an operation under this policy
    ///
    /// `retryable` classifies each error: `true` means wait and try again,
    /// `false` means give up immediately. The final error is returned once
    /// attempts are exhausted.
    pub async fn run<T, E, F, Fut, P>(&self, mut op: F, retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts || !retryable(&err) {
                        return Err(err);
                    }

                    let delay = self.delay_for(attempt - 1);
                    debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying after failure");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
        }
    }
}

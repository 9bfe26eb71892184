//! Retry with linear back-off for flaky admin requests.

use std::{fmt::Display, future::Future, time::Duration};

use metrics::counter;
use tracing::warn;

/// How many times to try an operation and how long to wait in between.
///
/// The wait before retry `n` (1-based) is `base_delay * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn delay_before(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(retry)
    }
}

/// Run `op` until it succeeds, `retryable` rejects the error, or the attempts
/// run out. The last error is returned.
pub async fn retry<T, E, Op, Fut, P>(policy: &RetryPolicy, retryable: P, mut op: Op) -> Result<T, E>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && retryable(&err) => {
                let delay = policy.delay_before(attempt);
                counter!("docdesk_retry_attempt_total").increment(1);
                warn!(
                    target = "docdesk::application::retry",
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "request failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

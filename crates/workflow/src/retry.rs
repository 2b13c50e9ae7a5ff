use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};

/// Retry policy injected into the workflow engine. Substituting
/// [`RetryPolicy::no_delay`] makes retry paths deterministic in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    /// Two retries (three attempts per window), short exponential backoff.
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 500,
            max_backoff_ms: 4000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    /// Same attempt bound, zero sleeps.
    pub fn no_delay(max_retries: usize) -> Self {
        Self::new(max_retries, 0, 0)
    }

    /// Drive `f` until it succeeds or the attempt budget is exhausted.
    pub async fn run<F, Fut, T, E>(&self, operation: &str, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        let mut backoff = Duration::from_millis(self.initial_backoff_ms);

        loop {
            match f().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!(
                            operation,
                            attempts = attempt + 1,
                            "operation succeeded after retries"
                        );
                    }
                    return Ok(result);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        warn!(
                            operation,
                            attempts = attempt,
                            error = %e,
                            "operation failed after max retries"
                        );
                        return Err(e);
                    }

                    warn!(
                        operation,
                        attempt,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "operation failed, retrying"
                    );

                    if !backoff.is_zero() {
                        sleep(backoff).await;
                    }

                    backoff = std::cmp::min(backoff * 2, Duration::from_millis(self.max_backoff_ms));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[tokio::test]
    async fn stops_after_attempt_budget() {
        let calls = Cell::new(0usize);

        let result: Result<(), &str> = RetryPolicy::no_delay(2)
            .run("always-fails", || {
                calls.set(calls.get() + 1);
                async { Err("boom") }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 3); // initial attempt + two retries
    }

    #[tokio::test]
    async fn returns_first_success() {
        let calls = Cell::new(0usize);

        let result: Result<usize, &str> = RetryPolicy::no_delay(2)
            .run("flaky", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { if n < 2 { Err("not yet") } else { Ok(n) } }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.get(), 2);
    }
}

//! Bounded retry with exponential backoff for model calls

use crate::config::ExtractorConfig;
use clausegraph_domain::ExtractionError;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Retry policy for one chunk × pass model call
///
/// Only transient errors are retried. A call that exceeds the per-call
/// timeout counts as a transient error.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: usize,
    initial_backoff: Duration,
    max_backoff: Duration,
    call_timeout: Duration,
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` includes the first try
    pub fn new(
        max_attempts: usize,
        initial_backoff: Duration,
        max_backoff: Duration,
        call_timeout: Duration,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff,
            call_timeout,
        }
    }

    /// Build the policy described by an extractor configuration
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.initial_backoff(),
            config.max_backoff(),
            config.call_timeout(),
        )
    }

    /// Maximum number of attempts, including the first
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Run `operation` until it succeeds, fails fatally, or attempts run out
    ///
    /// Returns the final outcome together with the number of attempts made.
    pub async fn run<F, Fut, T>(&self, label: &str, mut operation: F) -> (Result<T, ExtractionError>, usize)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ExtractionError>>,
    {
        let mut backoff = self.initial_backoff;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = match timeout(self.call_timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(ExtractionError::Transient(format!(
                    "model call timed out after {:?}",
                    self.call_timeout
                ))),
            };

            match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation = label, attempts = attempt, "Call succeeded after retries");
                    }
                    return (Ok(value), attempt);
                }
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(
                        operation = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Transient failure, retrying"
                    );
                    sleep(backoff).await;
                    backoff = std::cmp::min(backoff * 2, self.max_backoff);
                }
                Err(e) => return (Err(e), attempt),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy(max_attempts: usize) -> RetryPolicy {
        RetryPolicy::new(
            max_attempts,
            Duration::from_millis(1),
            Duration::from_millis(4),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_transient_then_success() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let (result, attempts) = fast_policy(3)
            .run("test", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ExtractionError::Transient("busy".to_string()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result, Ok(7));
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_fatal_is_not_retried() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let (result, attempts) = fast_policy(3)
            .run("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ExtractionError::Fatal("bad reply".to_string()))
            })
            .await;

        assert!(matches!(result, Err(ExtractionError::Fatal(_))));
        assert_eq!(attempts, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let (result, attempts) = fast_policy(2)
            .run("test", || async {
                Err::<(), _>(ExtractionError::Transient("down".to_string()))
            })
            .await;

        assert!(matches!(result, Err(ExtractionError::Transient(_))));
        assert_eq!(attempts, 2);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_transient() {
        let policy = RetryPolicy::new(
            1,
            Duration::from_millis(1),
            Duration::from_millis(1),
            Duration::from_millis(10),
        );
        let (result, _) = policy
            .run("test", || async {
                sleep(Duration::from_secs(5)).await;
                Ok::<_, ExtractionError>(())
            })
            .await;

        assert!(matches!(result, Err(ExtractionError::Transient(_))));
    }

    #[test]
    fn test_zero_attempts_means_one() {
        assert_eq!(fast_policy(0).max_attempts(), 1);
    }
}

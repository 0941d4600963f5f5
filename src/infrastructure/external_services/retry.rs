use std::future::Future;
use std::time::Duration;

use crate::application::ports::ProviderError;

/// Exponential backoff for provider calls. Only transient failures are
/// retried; the last error is returned once the budget is spent.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            backoff_factor,
            base_delay: Duration::from_secs(1),
        }
    }

    pub fn none() -> Self {
        Self::new(0, 1.0)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .mul_f64(self.backoff_factor.powi(attempt.saturating_sub(1) as i32))
    }

    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempts <= self.max_retries => {
                    let backoff_time = self.backoff(attempts);
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}, retrying in {} ms",
                        operation,
                        attempts,
                        self.max_retries + 1,
                        e,
                        backoff_time.as_millis()
                    );
                    tokio::time::sleep(backoff_time).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::ZERO,
            ..RetryPolicy::new(max_retries, 1.5)
        }
    }

    #[test]
    fn test_backoff_grows_by_factor() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(2), Duration::from_millis(1500));
        assert_eq!(policy.backoff(3), Duration::from_millis(2250));
    }

    #[tokio::test]
    async fn test_retries_transient_errors_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result = instant(3)
            .run("embed", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ProviderError::NetworkError("reset".to_string()))
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<(), _> = instant(2)
            .run("embed", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::RateLimitExceeded)
            })
            .await;

        assert_eq!(result.unwrap_err(), ProviderError::RateLimitExceeded);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_and_zero_budget_fail_fast() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<(), _> = instant(3)
            .run("complete", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::MissingCredentials("GROQ_API_KEY".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let result: Result<(), _> = RetryPolicy::none()
            .run("search", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::NetworkError("timeout".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}

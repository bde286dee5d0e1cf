//! Retry logic with exponential backoff
//!
//! Used for best-effort outbound calls:
//! - Exponential backoff with jitter
//! - Configurable retry policies
//! - Caller-supplied retryability predicate
//!
//! # Example
//!
//! ```rust,no_run
//! use ecoroute_core::retry::{retry_async, RetryConfig};
//!
//! # async fn demo() {
//! let result = retry_async(&RetryConfig::default(), |_: &std::io::Error| true, || async {
//!     Ok::<_, std::io::Error>("success")
//! })
//! .await;
//! # }
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Add random jitter to delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a config for quick retries
    pub fn quick() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(500),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Create a config for patient retries
    pub fn patient() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Calculate delay for a given attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_delay = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powi(attempt as i32 - 1);

        let delay_secs = base_delay.min(self.max_delay.as_secs_f64());

        let final_delay = if self.jitter {
            // Add up to 25% jitter
            delay_secs * (1.0 + rand::thread_rng().gen_range(0.0..0.25))
        } else {
            delay_secs
        };

        Duration::from_secs_f64(final_delay)
    }
}

/// Retry result with attempt information
#[derive(Debug)]
pub struct RetryResult<T> {
    /// The successful result
    pub value: T,
    /// Number of attempts made
    pub attempts: u32,
    /// Total time spent retrying
    pub total_duration: Duration,
}

/// Failure after the retry policy gave up
#[derive(Debug)]
pub struct RetryFailure<E> {
    /// The last error observed
    pub error: E,
    /// Number of attempts made
    pub attempts: u32,
}

/// Execute an async operation with retry logic
///
/// Errors for which `is_retryable` returns false end the loop immediately.
pub async fn retry_async<F, Fut, T, E, P>(
    config: &RetryConfig,
    is_retryable: P,
    mut operation: F,
) -> std::result::Result<RetryResult<T>, RetryFailure<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let start = Instant::now();
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = config.delay_for_attempt(attempt);
            debug!(attempt, delay_ms = delay.as_millis(), "Retrying after delay");
            tokio::time::sleep(delay).await;
        }
        attempt += 1;

        match operation().await {
            Ok(value) => {
                return Ok(RetryResult {
                    value,
                    attempts: attempt,
                    total_duration: start.elapsed(),
                });
            }
            Err(error) => {
                if attempt >= max_attempts || !is_retryable(&error) {
                    debug!(attempt, error = %error, "Giving up");
                    return Err(RetryFailure {
                        error,
                        attempts: attempt,
                    });
                }
                debug!(attempt, error = %error, "Attempt failed, will retry");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            jitter: false,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_first_attempt() {
        let result = retry_async(&fast(), |_: &String| true, || async { Ok::<_, String>("ok") })
            .await
            .unwrap();

        assert_eq!(result.value, "ok");
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_after_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_async(&fast(), |_: &String| true, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(format!("attempt {n} failed"))
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result.value, 3);
        assert_eq!(result.attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_all_failures() {
        let failure = retry_async(&fast(), |_: &&str| true, || async { Err::<(), _>("down") })
            .await
            .unwrap_err();

        assert_eq!(failure.attempts, 3);
        assert_eq!(failure.error, "down");
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_stops_immediately() {
        let calls = AtomicU32::new(0);
        let failure = retry_async(&fast(), |_: &&str| false, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("unauthorized") }
        })
        .await
        .unwrap_err();

        assert_eq!(failure.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_calculation() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: false,
            ..Default::default()
        };

        assert_eq!(config.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(2),
            jitter: false,
            ..Default::default()
        };
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(2));
    }
}

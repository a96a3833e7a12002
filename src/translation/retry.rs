/*!
 * Bounded retry with exponential backoff.
 *
 * An operation is attempted up to `max_retries + 1` times. An empty result
 * (`Ok(None)`) counts as a failure, the same as an error. Between attempts the
 * retrier suspends for `initial_delay * backoff_factor^attempt`; only the
 * retrying unit of work waits, the runtime keeps scheduling everything else.
 */

use async_trait::async_trait;
use log::{error, info, warn};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;

/// Retry settings for one class of operation
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Multiplier applied to the delay after every failed attempt
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            initial_delay,
            backoff_factor,
        }
    }

    /// Delay to wait after the failed attempt with the given zero-based index.
    ///
    /// Not capped; saturates at `Duration::MAX` instead of overflowing.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

/// Classifies errors into the retryable set
pub trait RetryableError: Display {
    fn is_retryable(&self) -> bool {
        true
    }
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        ProviderError::is_retryable(self)
    }
}

impl RetryableError for anyhow::Error {}

/// Suspension used between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs fallible async operations under a [`RetryPolicy`]
#[derive(Clone)]
pub struct Retrier {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for Retrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retrier").field("policy", &self.policy).finish_non_exhaustive()
    }
}

impl Retrier {
    /// Create a retrier that sleeps on the tokio timer
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, Arc::new(TokioSleeper))
    }

    /// Create a retrier with a custom sleeper
    pub fn with_sleeper(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it yields a value or the attempts run out.
    ///
    /// Returns `None` once every attempt has failed or a non-retryable error
    /// was seen. The last error is logged, never returned.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
        E: RetryableError,
    {
        let max_retries = self.policy.max_retries;

        for attempt in 0..=max_retries {
            let failure = match operation().await {
                Ok(Some(value)) => return Some(value),
                Ok(None) => "empty response".to_string(),
                Err(e) if !e.is_retryable() => {
                    error!("{} failed with a non-retryable error: {}", label, e);
                    return None;
                }
                Err(e) => e.to_string(),
            };

            if attempt == max_retries {
                error!(
                    "{} reached the maximum of {} retries, last error: {}",
                    label, max_retries, failure
                );
                return None;
            }

            let delay = self.policy.delay_for_attempt(attempt);
            warn!("{} attempt {} failed: {}", label, attempt + 1, failure);
            info!("Waiting {:.2} seconds before retrying...", delay.as_secs_f64());
            self.sleeper.sleep(delay).await;
        }

        None
    }
}

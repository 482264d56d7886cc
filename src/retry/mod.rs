//! Retry with exponential backoff
//!
//! Wraps the `backoff` crate. Retryable errors ([`LlmError::is_retryable`])
//! are retried up to `max_retries` times; anything else fails immediately.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

use crate::error::LlmError;

/// Backoff-based retry executor
#[derive(Debug, Clone)]
pub struct BackoffRetryExecutor {
    backoff: ExponentialBackoff,
    max_retries: u32,
}

impl Default for BackoffRetryExecutor {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_RETRIES)
    }
}

impl BackoffRetryExecutor {
    pub fn new(max_retries: u32) -> Self {
        Self::with_backoff(default_backoff(), max_retries)
    }

    pub fn with_backoff(backoff: ExponentialBackoff, max_retries: u32) -> Self {
        Self {
            backoff,
            max_retries,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Run `operation` until it succeeds, fails permanently, or the retry
    /// budget is spent.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, LlmError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let attempts = AtomicU32::new(0);
        let max_retries = self.max_retries;

        backoff::future::retry(self.backoff.clone(), || {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed);
            let fut = operation();
            async move {
                fut.await.map_err(|error| {
                    if error.is_retryable() && attempt < max_retries {
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_retries,
                            "Retrying completion after error: {}",
                            error
                        );
                        backoff::Error::transient(error)
                    } else {
                        backoff::Error::permanent(error)
                    }
                })
            }
        })
        .await
    }
}

fn default_backoff() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(1000))
        .with_max_interval(Duration::from_secs(60))
        .with_multiplier(2.0)
        .with_max_elapsed_time(Some(Duration::from_secs(300)))
        .build()
}

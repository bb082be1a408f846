use std::{fmt::Display, num::NonZeroU32, time::Duration};

use rand::Rng as _;
use tokio_util::sync::CancellationToken;

use crate::resilience::{ErrorKind, ExecuteError, Retryable};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("max retries must be at least 1")]
    ZeroRetries,
}

/// Bounded exponential backoff.
///
/// Attempt `k` that fails is followed by a delay of `base_delay * 2^(k-1)`
/// before attempt `k + 1`, unless `k` was the last attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: NonZeroU32,
    base_delay: Duration,
    jitter: bool,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Result<Self, PolicyError> {
        let max_retries = NonZeroU32::new(max_retries).ok_or(PolicyError::ZeroRetries)?;

        Ok(Self {
            max_retries,
            base_delay,
            jitter: false,
        })
    }

    /// Draws each delay uniformly from `[delay / 2, delay]`.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries.get()
    }

    /// Delay inserted after `attempt` (1-based) fails.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        let delay = self.base_delay.saturating_mul(factor);
        if !self.jitter {
            return delay;
        }

        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::thread_rng().gen_range(millis / 2..=millis))
    }

    /// Calls `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent. The error of the final attempt is returned as is.
    pub async fn run<F, Fut, T, E>(&self, mut operation: F, cancel: &CancellationToken) -> Result<T, ExecuteError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let mut attempt = 1;

        loop {
            if cancel.is_cancelled() {
                return Err(ExecuteError::Cancelled);
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ExecuteError::Cancelled),
                result = operation() => result,
            };

            let err = match result {
                Ok(value) => {
                    tracing::debug!(attempt, "attempt succeeded");
                    return Ok(value);
                },
                Err(err) => err,
            };

            let kind = err.kind();
            if kind == ErrorKind::Permanent || attempt >= self.max_retries.get() {
                tracing::warn!(attempt, %kind, "giving up: {err}");
                return Err(ExecuteError::Operation(err));
            }

            let delay = self.backoff_delay(attempt);
            tracing::debug!(attempt, %kind, ?delay, "attempt failed, backing off: {err}");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ExecuteError::Cancelled),
                _ = tokio::time::sleep(delay) => {},
            }

            attempt += 1;
        }
    }
}

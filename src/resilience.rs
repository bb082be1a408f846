//! Rate limiting and retry around outbound remote calls.
//!
//! [`ResilientExecutor`] gates every attempt through a shared [`RateLimiter`]
//! and retries failed attempts with exponential backoff as configured by a
//! [`RetryPolicy`].

use std::{fmt::Display, sync::Arc};

use strum::Display as StrumDisplay;
use tokio_util::sync::CancellationToken;

pub mod rate_limiter;
pub mod retry;

pub use rate_limiter::RateLimiter;
pub use retry::{PolicyError, RetryPolicy};

/// How an attempt failure should be treated by the retry loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Transient,
    Permanent,
    RateLimited,
}

/// Errors produced by a retried operation.
///
/// `Permanent` failures end the retry loop immediately; everything else is
/// retried until the attempt budget runs out.
pub trait Retryable {
    fn kind(&self) -> ErrorKind;
}

// Unclassified failures are retried uniformly.
impl Retryable for anyhow::Error {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Transient
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecuteError<E> {
    /// The error returned by the last attempt, unchanged.
    #[error("{0}")]
    Operation(E),
    #[error("operation cancelled")]
    Cancelled,
}

impl<E> ExecuteError<E> {
    pub fn into_operation(self) -> Option<E> {
        match self {
            Self::Operation(err) => Some(err),
            Self::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[derive(Clone, Debug)]
pub struct ResilientExecutor {
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
}

impl ResilientExecutor {
    pub fn new(limiter: Arc<RateLimiter>, policy: RetryPolicy) -> Self {
        Self {
            limiter,
            policy,
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, ExecuteError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        self.execute_with_cancel(operation, &CancellationToken::new()).await
    }

    /// Runs `operation` under the retry policy, waiting for the rate limiter
    /// before every attempt, retries included.
    ///
    /// The attempt future is created before the gate opens but is not polled
    /// until the limiter releases it.
    #[tracing::instrument(skip_all, fields(max_retries = self.policy.max_retries()))]
    pub async fn execute_with_cancel<F, Fut, T, E>(&self, mut operation: F, cancel: &CancellationToken) -> Result<T, ExecuteError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let limiter = &self.limiter;

        self.policy
            .run(
                || {
                    let attempt = operation();
                    async move {
                        limiter.wait_for_next_request().await;
                        attempt.await
                    }
                },
                cancel,
            )
            .await
    }
}

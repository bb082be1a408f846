use std::time::Duration;

use tokio::{sync::Mutex, time::Instant};

/// Enforces a minimum interval between successive releases.
///
/// Callers queue on the clock lock and keep holding it while they sleep, so
/// each one observes the delay accumulated by everyone ahead of it.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Returns once at least `min_interval` has passed since the previous
    /// release. Dropping the future before it completes leaves the clock
    /// untouched.
    #[tracing::instrument(skip(self), fields(min_interval = ?self.min_interval))]
    pub async fn wait_for_next_request(&self) {
        let mut last_request = self.last_request.lock().await;

        if let Some(last) = *last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!(?wait, "waiting for rate limiter");
                tokio::time::sleep(wait).await;
            }
        }

        *last_request = Some(Instant::now());
    }
}

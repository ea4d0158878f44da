//! Pauses between provider calls.
//!
//! The batching loops never sleep directly; they report what happened to a
//! [`Pacer`] and let it decide how long to wait.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

/// Wait used when a 429 response carries no `Retry-After` header.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Margin added on top of the provider's advised wait.
pub const RETRY_AFTER_MARGIN: Duration = Duration::from_secs(1);

/// Wait before retrying a request that failed with a transient error.
pub const TRANSIENT_RETRY_DELAY: Duration = Duration::from_secs(10);

#[async_trait]
pub trait Pacer: Send + Sync {
    /// Called once chunk `index` has been fully processed.
    async fn chunk_done(&self, index: usize);

    /// Called when the provider throttled a request, before it is retried.
    async fn rate_limited(&self, retry_after: Option<Duration>);

    /// Called before retry number `attempt` (starting at 1) of a request that
    /// failed with a transient error.
    async fn transient_retry(&self, attempt: u32);
}

/// How long to wait after a rate-limit response.
pub fn rate_limit_wait(retry_after: Option<Duration>) -> Duration {
    retry_after.unwrap_or(DEFAULT_RETRY_AFTER) + RETRY_AFTER_MARGIN
}

/// Sleeps a fixed delay after every chunk.
#[derive(Debug, Clone)]
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    async fn chunk_done(&self, _index: usize) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }

    async fn rate_limited(&self, retry_after: Option<Duration>) {
        sleep(rate_limit_wait(retry_after)).await;
    }

    async fn transient_retry(&self, _attempt: u32) {
        sleep(TRANSIENT_RETRY_DELAY).await;
    }
}

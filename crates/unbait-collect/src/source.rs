use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use unbait_core::NormalizedArticle;

use crate::error::CollectError;

/// Capability interface implemented by every article producer.
///
/// Implementations convert their native format into [`NormalizedArticle`]
/// and drop any record with an empty title or url before returning. Network
/// failures surface as `Err` — the coordinator isolates them per source.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Stable registry key, e.g. `bbc-news`.
    fn key(&self) -> &str;

    /// Human-readable source name, e.g. `BBC News`.
    fn name(&self) -> &str;

    /// Fetch up to `max_articles` normalized articles.
    async fn fetch(&self, max_articles: usize) -> Result<Vec<NormalizedArticle>, CollectError>;

    /// Advisory robots/politeness probe. `false` means the source asks not
    /// to be polled; callers log it but are not hard-blocked.
    async fn check_access_policy(&self) -> bool;
}

/// Enforces a minimum delay between requests to one host, measured from the
/// end of the previous request.
pub struct RateGate {
    min_delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateGate {
    #[must_use]
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_request: Mutex::new(None),
        }
    }

    /// Sleeps until the configured delay since the previous [`Self::release`]
    /// has elapsed. Call before each request.
    pub async fn acquire(&self) {
        let last = *self.last_request.lock().await;
        if let Some(last) = last {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                let wait = self.min_delay - elapsed;
                tracing::debug!(wait_ms = wait.as_millis() as u64, "rate gate: sleeping");
                tokio::time::sleep(wait).await;
            }
        }
    }

    /// Marks the end of a request; the next [`Self::acquire`] measures its
    /// delay from this point.
    pub async fn release(&self) {
        *self.last_request.lock().await = Some(Instant::now());
    }
}

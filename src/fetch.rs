use std::time::Duration;

use anyhow::{anyhow, Result};
use rand::Rng;
use tracing::warn;

const MAX_RETRIES: u32 = 5;
const BACKOFF_CAP_SECS: f64 = 30.0;
const POLITE_DELAY_RANGE_SECS: (f64, f64) = (1.0, 3.0);

/// Capped exponential backoff with up to a second of jitter.
pub fn exponential_backoff(attempt: u32) -> Duration {
    let jitter: f64 = rand::rng().random_range(0.0..1.0);
    let secs = (2f64.powi(attempt as i32) + jitter).min(BACKOFF_CAP_SECS);
    Duration::from_secs_f64(secs)
}

/// HTTP collaborator. The extraction core never sees this layer: it
/// receives pre-fetched text, or a per-item fetch-failed signal.
pub struct Fetcher {
    client: reqwest::Client,
    backoff: fn(u32) -> Duration,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("deal_scraper/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            backoff: exponential_backoff,
        })
    }

    /// Swap the backoff schedule (tests use a zero delay).
    pub fn with_backoff(mut self, backoff: fn(u32) -> Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// GET with a bounded retry loop around transient failures.
    pub async fn get(&self, url: &str) -> Result<String> {
        let mut last_err = None;
        for attempt in 0..MAX_RETRIES {
            match self.try_get(url).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(
                        "fetch {} failed (attempt {}/{}): {}",
                        url,
                        attempt + 1,
                        MAX_RETRIES,
                        e
                    );
                    last_err = Some(e);
                    if attempt + 1 < MAX_RETRIES {
                        tokio::time::sleep((self.backoff)(attempt)).await;
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("fetch failed: {}", url)))
    }

    async fn try_get(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().await?.error_for_status()?;
        Ok(resp.text().await?)
    }

    /// Randomized pause between successive article requests.
    pub async fn polite_delay(&self) {
        let (lo, hi) = POLITE_DELAY_RANGE_SECS;
        let secs: f64 = rand::rng().random_range(lo..hi);
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_and_stays_capped() {
        let first = exponential_backoff(0);
        assert!(first >= Duration::from_secs(1));
        assert!(first < Duration::from_secs(3));

        let capped = exponential_backoff(10);
        assert_eq!(capped, Duration::from_secs_f64(BACKOFF_CAP_SECS));
    }

    #[tokio::test]
    async fn invalid_url_errors_without_panicking() {
        let fetcher = Fetcher::new().unwrap().with_backoff(|_| Duration::ZERO);
        assert!(fetcher.get("not a url").await.is_err());
    }
}

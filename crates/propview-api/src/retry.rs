// Backoff handling for flaky record-service calls
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy for record-service requests
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total tries including the first one
    pub attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub base_delay: Duration,
    /// Cap on the per-retry delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(15),
        }
    }
}

impl RetryConfig {
    /// Delay before the given retry (1-based), doubling up to the cap
    fn delay_for(&self, retry: u32) -> Duration {
        let doublings = (retry - 1).min(16);
        self.base_delay
            .saturating_mul(1u32 << doublings)
            .min(self.max_delay)
    }
}

/// Run a request closure until it succeeds or the attempt budget runs out
pub async fn with_backoff<F, Fut, T, E>(config: &RetryConfig, mut call: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut tried = 0;
    loop {
        tried += 1;
        match call().await {
            Ok(value) => {
                if tried > 1 {
                    debug!("record service call succeeded on try {tried}");
                }
                return Ok(value);
            }
            Err(err) if tried < config.attempts => {
                let wait = config.delay_for(tried);
                warn!(
                    "record service call failed (try {tried}/{}): {err}; backing off {wait:?}",
                    config.attempts
                );
                sleep(wait).await;
            }
            Err(err) => {
                warn!("record service call failed after {tried} tries: {err}");
                return Err(err);
            }
        }
    }
}

/// Whether a failed response is worth retrying
pub fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status.is_server_error()
        || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
}

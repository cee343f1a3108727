//! Backoff policy for trips API calls.
//!
//! Only transport failures (refused connections, timeouts) are retried.
//! A response with any status is handed back on the attempt that got it.

use std::future::Future;
use std::time::Duration;

/// How [`HttpTripSource`](crate::HttpTripSource) retries a request whose
/// transport failed. The delay doubles after each retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// Three retries after 200, 400 and 800 ms.
    fn default() -> Self {
        Self {
            retries: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Fail on the first transport error.
    pub const fn none() -> Self {
        Self {
            retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (0-based).
    pub fn delay(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }

    /// Upper bound on the time spent sleeping between attempts.
    pub fn total_backoff(&self) -> Duration {
        (0..self.retries).map(|r| self.delay(r)).sum()
    }

    /// Run `send` until it returns a response or the retries are used up.
    pub(crate) async fn send<F, Fut>(&self, endpoint: &str, send: F) -> Result<reqwest::Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut retry = 0;
        loop {
            match send().await {
                Ok(resp) => return Ok(resp),
                Err(e) if retry < self.retries => {
                    let delay = self.delay(retry);
                    retry += 1;
                    tracing::warn!(
                        endpoint,
                        attempt = retry,
                        retries = self.retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "trips API unreachable, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

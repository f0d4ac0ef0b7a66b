use log::{debug, warn};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::settings::RetrySettings;
use crate::errors::FetchError;

/// Bounded retries with linearly increasing backoff between attempts
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: usize,
    step: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            step,
        }
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(settings.max_attempts, settings.backoff_step)
    }

    /// Delay before the attempt following `attempt` (1-based)
    pub fn backoff(&self, attempt: usize) -> Duration {
        self.step * attempt as u32
    }

    /// Run `op` until it succeeds or the attempts run out. A non-transient
    /// error is returned as is, without further attempts.
    pub async fn run<T, F, Fut>(&self, url: &str, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        for attempt in 1..=self.max_attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => {
                    debug!("Not retrying {}: {}", url, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        "Error fetching {} (attempt {}/{}): {}",
                        url, attempt, self.max_attempts, e
                    );
                    if self.is_last(attempt) {
                        break;
                    }
                    let wait = self.backoff(attempt);
                    debug!("Retrying {} in {:?}", url, wait);
                    self.apply_delay(wait).await;
                }
            }
        }

        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: self.max_attempts,
        })
    }

    fn is_last(&self, attempt: usize) -> bool {
        attempt >= self.max_attempts
    }

    async fn apply_delay(&self, wait: Duration) {
        if !wait.is_zero() {
            sleep(wait).await;
        }
    }
}

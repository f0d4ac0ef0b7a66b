use std::time::Duration;
use thiserror::Error;

/// Errors from a single fetch attempt, or from running out of attempts
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("Browser error: {0}")]
    Render(#[from] chromiumoxide::error::CdpError),
    #[error("Timeout after {0:?}")]
    Timeout(Duration),
    #[error("Failed to launch browser: {0}")]
    Launch(String),
    #[error("Giving up on {url} after {attempts} attempts")]
    Exhausted { url: String, attempts: usize },
    #[error("Page slots closed")]
    Closed,
}

impl FetchError {
    /// Whether another attempt could succeed; client errors other than
    /// timeouts and rate limiting are final
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::Render(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => !(400..500).contains(status) || matches!(status, 408 | 429),
            Self::Launch(_) | Self::Exhausted { .. } | Self::Closed => false,
        }
    }
}

/// Add context to fetch errors
pub fn fetch_context(url: &str) -> String {
    format!("Failed to fetch from: {}", url)
}

/// Add context to persistence errors
pub fn persist_context(operation: &str, collection: &str) -> String {
    format!("Failed to {} {} collection", operation, collection)
}

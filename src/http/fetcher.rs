use log::warn;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::config::settings::DEFAULT_MAX_OPEN_PAGES;
use crate::errors::FetchError;

use super::retry::RetryPolicy;
use super::source::PageSource;

/// Retry and timeout envelope around a [`PageSource`]
///
/// A fetch that exhausts its attempts yields `None`. Callers scrape hundreds
/// of independent pages and treat a missing page as missing data.
///
/// Renders share one pool of page slots however the callers nest their
/// fan-outs. A slot is held for one attempt, not during backoff.
pub struct Fetcher<S> {
    source: S,
    retry: RetryPolicy,
    attempt_timeout: Duration,
    page_slots: Semaphore,
}

impl<S: PageSource> Fetcher<S> {
    pub fn new(source: S, retry: RetryPolicy, attempt_timeout: Duration) -> Self {
        Self {
            source,
            retry,
            attempt_timeout,
            page_slots: Semaphore::new(DEFAULT_MAX_OPEN_PAGES),
        }
    }

    pub fn with_max_open_pages(mut self, max_open_pages: usize) -> Self {
        self.page_slots = Semaphore::new(max_open_pages.max(1));
        self
    }

    /// Fully rendered HTML of a site page
    pub async fn fetch_page(&self, url: &str) -> Option<String> {
        let result = self
            .retry
            .run(url, move || async move {
                let _slot = self.page_slots.acquire().await.map_err(|_| FetchError::Closed)?;
                self.with_timeout(self.source.render(url)).await
            })
            .await;
        Self::into_content(url, result)
    }

    /// Body of a plain endpoint, fetched without rendering
    pub async fn fetch_text(&self, url: &str) -> Option<String> {
        let result = self
            .retry
            .run(url, || self.with_timeout(self.source.get_text(url)))
            .await;
        Self::into_content(url, result)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    async fn with_timeout<F>(&self, attempt: F) -> Result<String, FetchError>
    where
        F: Future<Output = Result<String, FetchError>>,
    {
        match timeout(self.attempt_timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.attempt_timeout)),
        }
    }

    fn into_content(url: &str, result: Result<String, FetchError>) -> Option<String> {
        match result {
            Ok(content) if !content.trim().is_empty() => Some(content),
            Ok(_) => {
                warn!("Empty content from {}", url);
                None
            }
            Err(e) => {
                warn!("{}: {}", crate::errors::fetch_context(url), e);
                None
            }
        }
    }
}

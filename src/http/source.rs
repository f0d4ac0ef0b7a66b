use crate::errors::FetchError;

use super::client::HttpClient;
use super::renderer::BrowserRenderer;

/// Where page content comes from
///
/// Each method performs exactly one attempt; retrying and timeouts are
/// layered on top by [`super::Fetcher`].
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// HTML of `url` after client-side scripts have populated it
    async fn render(&self, url: &str) -> Result<String, FetchError>;

    /// Raw body of `url` from a plain GET
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Headless browser for site pages, plain HTTP for the ratings API
pub struct LiveSource {
    renderer: BrowserRenderer,
    http: HttpClient,
}

impl LiveSource {
    pub fn new(renderer: BrowserRenderer, http: HttpClient) -> Self {
        Self { renderer, http }
    }

    pub async fn shutdown(self) {
        self.renderer.shutdown().await;
    }
}

impl PageSource for LiveSource {
    async fn render(&self, url: &str) -> Result<String, FetchError> {
        self.renderer.render(url).await
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.http.get_text(url).await
    }
}

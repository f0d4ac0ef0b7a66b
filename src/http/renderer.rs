use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use futures::StreamExt;
use log::{debug, warn};
use reqwest::Url;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};

use crate::config::settings::ScraperSettings;
use crate::errors::FetchError;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const ATTEMPT_MARGIN: Duration = Duration::from_secs(1);

/// Headless Chromium shared by all fetches of a run, one tab per page
pub struct BrowserRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
    page_load_timeout: Duration,
    iframe_probe_timeout: Duration,
    render_deadline: Duration,
}

impl BrowserRenderer {
    pub async fn launch(settings: &ScraperSettings) -> Result<Self, FetchError> {
        let config = Self::build_config(settings)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser event error: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            page_load_timeout: settings.page_load_timeout,
            iframe_probe_timeout: settings.iframe_probe_timeout,
            render_deadline: Self::render_budget(settings),
        })
    }

    /// Upper bound for one attempt at [`Self::render`]: opening and closing
    /// the tab are CDP requests bounded by the page-load timeout, and the
    /// work in between by the render deadline
    pub fn attempt_timeout(settings: &ScraperSettings) -> Duration {
        settings.page_load_timeout * 2 + Self::render_budget(settings) + ATTEMPT_MARGIN
    }

    /// Body wait on the page and again inside a frame, plus the frame probe
    fn render_budget(settings: &ScraperSettings) -> Duration {
        settings.page_load_timeout * 2 + settings.iframe_probe_timeout
    }

    /// Render `url`, descending into an embedded frame when the page has one.
    /// The tab is closed on every path, including a timed-out render.
    pub async fn render(&self, url: &str) -> Result<String, FetchError> {
        let page = self.browser.new_page(url).await?;
        let result = within(self.render_deadline, self.render_page(&page, url)).await;

        if let Err(e) = page.close().await {
            debug!("Failed to close tab for {}: {}", url, e);
        }
        result
    }

    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed waiting for browser exit: {}", e);
        }
        if let Err(e) = self.handler.await {
            debug!("Browser handler task ended abnormally: {}", e);
        }
    }

    fn build_config(settings: &ScraperSettings) -> Result<BrowserConfig, FetchError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1920, 1080)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", settings.user_agent))
            .request_timeout(settings.page_load_timeout);

        if let Ok(path) = std::env::var("CHROME_PATH") {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(FetchError::Launch)
    }

    async fn render_page(&self, page: &Page, url: &str) -> Result<String, FetchError> {
        self.wait_for_body(page).await?;

        if let Some(frame_url) = self.probe_frame(page, url).await? {
            debug!("  Iframe found on {}, switching to {}", url, frame_url);
            page.goto(frame_url.as_str()).await?;
            self.wait_for_body(page).await?;
        }

        Ok(page.content().await?)
    }

    async fn wait_for_body(&self, page: &Page) -> Result<(), FetchError> {
        match wait_for(page, "body", self.page_load_timeout).await {
            Some(_) => Ok(()),
            None => Err(FetchError::Timeout(self.page_load_timeout)),
        }
    }

    async fn probe_frame(&self, page: &Page, url: &str) -> Result<Option<String>, FetchError> {
        let Some(frame) = wait_for(page, "iframe", self.iframe_probe_timeout).await else {
            return Ok(None);
        };
        let src = frame.attribute("src").await?;
        Ok(src.and_then(|src| resolve_frame_url(url, &src)))
    }
}

async fn within<F>(limit: Duration, work: F) -> Result<String, FetchError>
where
    F: Future<Output = Result<String, FetchError>>,
{
    timeout(limit, work).await.unwrap_or(Err(FetchError::Timeout(limit)))
}

/// Poll for `selector` until it appears or `limit` passes
async fn wait_for(page: &Page, selector: &str, limit: Duration) -> Option<Element> {
    let deadline = Instant::now() + limit;
    loop {
        if let Ok(element) = page.find_element(selector).await {
            return Some(element);
        }
        if Instant::now() >= deadline {
            return None;
        }
        sleep(POLL_INTERVAL).await;
    }
}

fn resolve_frame_url(page_url: &str, src: &str) -> Option<String> {
    let src = src.trim();
    if src.is_empty() || src.starts_with("about:") || src.starts_with("javascript:") {
        return None;
    }
    let base = Url::parse(page_url).ok()?;
    base.join(src).ok().map(String::from)
}

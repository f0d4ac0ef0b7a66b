pub mod client;
pub mod fetcher;
pub mod renderer;
pub mod retry;
pub mod source;

pub use client::HttpClient;
pub use fetcher::Fetcher;
pub use renderer::BrowserRenderer;
pub use retry::RetryPolicy;
pub use source::{LiveSource, PageSource};

use std::path::PathBuf;
use std::time::Duration;

use super::federations::{FederationConfig, get_federations};

pub struct ClubSettings {
    pub prefix: String,
}

impl Default for ClubSettings {
    fn default() -> Self {
        Self {
            prefix: "SISSA".to_string(),
        }
    }
}

pub struct ScraperSettings {
    pub user_agent: String,
    pub page_load_timeout: Duration,
    pub iframe_probe_timeout: Duration,
    pub api_timeout: Duration,
    pub ratings_api_base: String,
    /// Stop following "next" links after this many index pages per federation
    pub max_listing_pages: Option<usize>,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            page_load_timeout: Duration::from_secs(30),
            iframe_probe_timeout: Duration::from_secs(3),
            api_timeout: Duration::from_secs(10),
            ratings_api_base: "https://ratingviewer.nl".to_string(),
            max_listing_pages: None,
        }
    }
}

pub struct RetrySettings {
    pub max_attempts: usize,
    pub backoff_step: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_step: Duration::from_secs(5),
        }
    }
}

pub const DEFAULT_MAX_OPEN_PAGES: usize = 50;

/// Worker-pool width per crawl stage
///
/// Stage pools nest (pairings inside teams, rounds inside players), so
/// `max_open_pages` caps the renders in flight across all of them.
pub struct ConcurrencySettings {
    pub teams: usize,
    pub divisions: usize,
    pub players: usize,
    pub sub_fetches: usize,
    pub max_open_pages: usize,
}

impl Default for ConcurrencySettings {
    fn default() -> Self {
        Self {
            teams: 50,
            divisions: 50,
            players: 50,
            sub_fetches: 10,
            max_open_pages: DEFAULT_MAX_OPEN_PAGES,
        }
    }
}

impl ConcurrencySettings {
    pub fn uniform(width: usize) -> Self {
        let width = width.max(1);
        Self {
            teams: width,
            divisions: width,
            players: width,
            sub_fetches: width.min(10),
            max_open_pages: width,
        }
    }
}

pub struct OutputSettings {
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

pub struct AppConfig {
    pub club: ClubSettings,
    pub federations: Vec<FederationConfig>,
    pub scraper: ScraperSettings,
    pub retry: RetrySettings,
    pub concurrency: ConcurrencySettings,
    pub output: OutputSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            club: ClubSettings::default(),
            federations: get_federations(),
            scraper: ScraperSettings::default(),
            retry: RetrySettings::default(),
            concurrency: ConcurrencySettings::default(),
            output: OutputSettings::default(),
        }
    }

    pub fn federation(&self, federation: crate::domain::Federation) -> Option<&FederationConfig> {
        self.federations.iter().find(|f| f.federation == federation)
    }
}

use anyhow::{Context, Result};
use log::debug;

use super::common::{parse_document, selector, text_of};
use crate::config::FederationConfig;
use crate::domain::TeamInstance;

/// Matches link texts of the form `{prefix} {roman or arabic numeral}`
pub struct TeamNamePattern {
    regex: regex::Regex,
}

impl TeamNamePattern {
    pub fn new(prefix: &str) -> Result<Self> {
        let pattern = format!(r"(?i)^{}\s+[IVXLCDM\d]+", regex::escape(prefix.trim()));
        let regex = regex::Regex::new(&pattern).context("Failed to compile team name pattern")?;
        Ok(Self { regex })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Team listings found on one page of a competition index
#[derive(Debug, Default)]
pub struct CompetitionPage {
    pub teams: Vec<TeamInstance>,
    pub next_url: Option<String>,
}

/// Collect every link whose text names a club team
///
/// The same team listed under several competition phases is returned once per
/// listing; collapsing them is left to aggregation.
pub fn extract_competition(
    content: Option<&str>,
    federation: &FederationConfig,
    pattern: &TeamNamePattern,
) -> CompetitionPage {
    let Some(content) = content else {
        return CompetitionPage::default();
    };
    let document = parse_document(content);
    let link_selector = selector("a[href]");

    let mut page = CompetitionPage::default();
    for link in document.select(&link_selector) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let text = text_of(link);

        if pattern.matches(&text) {
            debug!("  Found team: {} ({})", text, federation.federation);
            page.teams.push(TeamInstance {
                name: text,
                url: federation.absolute(href),
                federation: federation.federation,
            });
        } else if page.next_url.is_none() && is_next_link(link, &text, href) {
            page.next_url = Some(federation.absolute(href));
        }
    }
    page
}

fn is_next_link(link: scraper::ElementRef, text: &str, href: &str) -> bool {
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return false;
    }
    let rel_next = link.value().attr("rel").is_some_and(|rel| rel.contains("next"));
    let class_next = link.value().attr("class").is_some_and(|c| c.contains("next"));
    let text_next = text.contains('»') || text.contains("Next") || text.contains("Volgende");
    rel_next || class_next || text_next
}

use log::{info, warn};

use crate::config::FederationConfig;
use crate::domain::TeamInstance;
use crate::extractors::{TeamNamePattern, extract_competition};
use crate::http::{Fetcher, PageSource};
use crate::pagination::ListingCursor;

/// Walk each federation's competition index and collect the club's team listings
///
/// A team listed in several competition phases appears once per listing.
pub async fn discover_teams<S: PageSource>(
    fetcher: &Fetcher<S>,
    federations: &[FederationConfig],
    pattern: &TeamNamePattern,
    max_pages: Option<usize>,
) -> Vec<TeamInstance> {
    let mut instances = Vec::new();

    for federation in federations {
        let mut cursor = ListingCursor::new(federation.competition_url(), max_pages);
        let mut found = 0;

        while let Some(url) = cursor.next_page() {
            let content = fetcher.fetch_page(&url).await;
            if content.is_none() {
                warn!("Could not load competition page {}", url);
            }
            let page = extract_competition(content.as_deref(), federation, pattern);
            found += page.teams.len();
            instances.extend(page.teams);
            cursor.follow(page.next_url);
        }

        info!(
            "  → {}: {} team listings on {} page(s)",
            federation.federation,
            found,
            cursor.pages_taken()
        );
    }

    instances
}

use anyhow::Result;
use chrono::NaiveDate;
use log::info;
use std::collections::{BTreeSet, HashSet};

use crate::cache::Store;
use crate::config::AppConfig;
use crate::domain::{TeamCollection, TeamInstance};
use crate::extractors::TeamNamePattern;
use crate::http::{Fetcher, PageSource};

use super::discovery::discover_teams;
use super::fan_out::fan_out;
use super::scrape::Scraper;

#[derive(Debug, Default)]
pub struct RepairReport {
    pub failed: usize,
    pub repaired: usize,
    pub still_empty: Vec<String>,
}

/// Re-fetch teams that an earlier crawl left without roster and matches,
/// then save the teams collection again
pub struct RepairService<'a, S> {
    config: &'a AppConfig,
    fetcher: &'a Fetcher<S>,
    store: Store,
    pattern: TeamNamePattern,
    today: NaiveDate,
}

impl<'a, S: PageSource> RepairService<'a, S> {
    pub fn new(config: &'a AppConfig, fetcher: &'a Fetcher<S>, today: NaiveDate) -> Result<Self> {
        Ok(Self {
            config,
            fetcher,
            store: Store::new(&config.output.dir)?,
            pattern: TeamNamePattern::new(&config.club.prefix)?,
            today,
        })
    }

    pub async fn run(&self) -> Result<RepairReport> {
        info!("=== Starting Repair ===\n");
        let mut teams = self.store.load_teams()?;

        let failed: BTreeSet<String> = teams
            .iter()
            .filter(|team| team.is_empty())
            .map(|team| team.name.clone())
            .collect();
        let mut report = RepairReport {
            failed: failed.len(),
            ..Default::default()
        };
        if failed.is_empty() {
            info!("No empty teams, nothing to repair");
            return Ok(report);
        }
        info!("  → {} empty teams to repair\n", failed.len());

        info!("Step 1: Rediscovering failed teams...");
        let targets = self.targets(&teams, &failed).await;
        info!("  → {} listings to re-fetch\n", targets.len());

        info!("Step 2: Re-fetching teams...");
        let scraper = Scraper::new(self.fetcher, self.config, self.today);
        let fetched = fan_out("repaired teams", targets, self.config.concurrency.teams, |instance| {
            scraper.scrape_team(instance)
        })
        .await;

        let mut repaired = TeamCollection::new();
        for team in fetched {
            repaired.add(team);
        }
        for team in repaired.into_map().into_values() {
            if !team.is_empty() {
                teams.replace(team);
                report.repaired += 1;
            }
        }
        report.still_empty = failed
            .into_iter()
            .filter(|name| teams.get(name).is_some_and(|team| team.is_empty()))
            .collect();
        info!(
            "  → Repaired {} of {} teams, {} still empty\n",
            report.repaired, report.failed, report.still_empty.len()
        );

        info!("Step 3: Saving teams...");
        self.store.save_teams(&teams)?;

        info!("=== Repair Complete ===");
        Ok(report)
    }

    /// Listings for the failed teams: whatever discovery finds under their
    /// names, plus the stored source URLs of teams discovery does not list
    async fn targets(&self, teams: &TeamCollection, failed: &BTreeSet<String>) -> Vec<TeamInstance> {
        let max_pages = self.config.scraper.max_listing_pages;
        let mut targets: Vec<TeamInstance> =
            discover_teams(self.fetcher, &self.config.federations, &self.pattern, max_pages)
                .await
                .into_iter()
                .filter(|instance| failed.contains(&instance.name))
                .collect();

        let mut known: HashSet<String> = targets.iter().map(|t| t.url.clone()).collect();
        for name in failed {
            let Some(team) = teams.get(name) else {
                continue;
            };
            for url in &team.source_urls {
                if known.insert(url.clone()) {
                    targets.push(TeamInstance {
                        name: team.name.clone(),
                        url: url.clone(),
                        federation: team.federation,
                    });
                }
            }
        }
        targets
    }
}

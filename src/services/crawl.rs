use anyhow::Result;
use chrono::NaiveDate;
use log::{error, info, warn};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::cache::{DIVISIONS_FILE, PLAYERS_FILE, Store, TEAMS_FILE};
use crate::config::AppConfig;
use crate::domain::{
    DivisionCollection, DivisionRef, LocalRef, PlayerCollection, Team, TeamCollection, TeamInstance,
    ordering::sort_team_names,
};
use crate::extractors::TeamNamePattern;
use crate::http::{Fetcher, PageSource};

use super::discovery::discover_teams;
use super::fan_out::fan_out;
use super::scrape::Scraper;

/// Totals of a finished crawl
#[derive(Debug, Default)]
pub struct CrawlReport {
    pub team_listings: usize,
    pub teams: usize,
    pub empty_teams: usize,
    pub divisions: usize,
    pub players: usize,
    pub unresolved_players: usize,
    /// Collections that could not be written
    pub persist_failures: Vec<&'static str>,
}

/// Full crawl: discover the club's teams, follow them into divisions and
/// players, aggregate, and write the three collections
pub struct CrawlService<'a, S> {
    config: &'a AppConfig,
    fetcher: &'a Fetcher<S>,
    store: Store,
    pattern: TeamNamePattern,
    today: NaiveDate,
}

impl<'a, S: PageSource> CrawlService<'a, S> {
    pub fn new(config: &'a AppConfig, fetcher: &'a Fetcher<S>, today: NaiveDate) -> Result<Self> {
        Ok(Self {
            config,
            fetcher,
            store: Store::new(&config.output.dir)?,
            pattern: TeamNamePattern::new(&config.club.prefix)?,
            today,
        })
    }

    /// `None` when no team of the club could be found, in which case nothing is written
    pub async fn run(&self) -> Result<Option<CrawlReport>> {
        info!("=== Starting Crawl for {} ===\n", self.config.club.prefix);
        let scraper = Scraper::new(self.fetcher, self.config, self.today);
        let mut report = CrawlReport::default();

        // Step 1: Discover team listings
        let instances = self.discover().await;
        if instances.is_empty() {
            warn!("No teams matching '{}' found on any competition page, nothing to do", self.config.club.prefix);
            return Ok(None);
        }
        report.team_listings = instances.len();
        info!("  → Found {} team listings\n", instances.len());

        // Step 2: Fetch the club's teams
        info!("Step 2: Fetching club teams...");
        let fetched_urls: HashSet<String> = instances.iter().map(|i| i.url.clone()).collect();
        let fetched_names: HashSet<String> = instances.iter().map(|i| i.name.clone()).collect();
        let mut teams = self.fetch_teams(&scraper, "club teams", instances).await;
        let division_refs = collect_division_refs(&teams);
        info!("  → {} distinct divisions referenced\n", division_refs.len());

        // Step 3: Fetch divisions
        info!("Step 3: Fetching divisions...");
        let divisions = self.fetch_divisions(&scraper, division_refs).await;
        info!("  → Fetched {} divisions with data\n", divisions.len());

        // Step 4: Fetch opposing teams named by the divisions
        info!("Step 4: Fetching remaining division teams...");
        let remaining = self.remaining_teams(&divisions, &fetched_urls, &fetched_names);
        info!("  → {} teams not fetched yet", remaining.len());
        teams.extend(self.fetch_teams(&scraper, "division teams", remaining).await);

        // Step 5: Aggregate teams
        info!("Step 5: Aggregating teams...");
        let mut collection = TeamCollection::new();
        for team in teams {
            collection.add(team);
        }
        report.teams = collection.len();
        report.empty_teams = collection.iter().filter(|t| t.is_empty()).count();
        info!("  → {} teams, {} without data\n", report.teams, report.empty_teams);

        // Step 6: Fetch players
        info!("Step 6: Fetching players...");
        let player_targets = self.player_targets(&collection, &divisions);
        info!("  → {} unique players", player_targets.len());
        let observations = fan_out(
            "players",
            player_targets.into_iter().collect(),
            self.config.concurrency.players,
            |(reference, url)| scraper.scrape_player(reference, url),
        )
        .await;
        info!("  → {} round dates looked up\n", scraper.cached_round_dates());

        // Step 7: Aggregate players
        info!("Step 7: Aggregating players...");
        let mut players = PlayerCollection::new();
        for observation in observations {
            players.add(observation);
        }
        players.attach_memberships(&collection);
        report.players = players.len();
        report.unresolved_players = players.unresolved_count();
        info!(
            "  → {} players, {} observations without universal id dropped\n",
            report.players, report.unresolved_players
        );

        // Step 8: Persist
        info!("Step 8: Saving collections to {}...", self.store.dir().display());
        report.divisions = divisions.len();
        report.persist_failures = self.persist(&collection, &divisions, &players);

        self.log_club_summary(&collection);
        info!("=== Crawl Complete ===");
        Ok(Some(report))
    }

    async fn discover(&self) -> Vec<TeamInstance> {
        info!("Step 1: Discovering teams from competition pages...");
        let max_pages = self.config.scraper.max_listing_pages;
        discover_teams(self.fetcher, &self.config.federations, &self.pattern, max_pages).await
    }

    async fn fetch_teams(&self, scraper: &Scraper<'_, S>, stage: &'static str, instances: Vec<TeamInstance>) -> Vec<Team> {
        fan_out(stage, instances, self.config.concurrency.teams, |instance| {
            scraper.scrape_team(instance)
        })
        .await
    }

    async fn fetch_divisions(&self, scraper: &Scraper<'_, S>, refs: BTreeSet<DivisionRef>) -> DivisionCollection {
        let fetched = fan_out(
            "divisions",
            refs.into_iter().collect(),
            self.config.concurrency.divisions,
            |reference| scraper.scrape_division(reference),
        )
        .await;

        let mut divisions = DivisionCollection::new();
        for division in fetched {
            divisions.add(division);
        }
        divisions
    }

    /// Teams listed by a division that neither the discovered URLs nor names cover
    fn remaining_teams(
        &self,
        divisions: &DivisionCollection,
        fetched_urls: &HashSet<String>,
        fetched_names: &HashSet<String>,
    ) -> Vec<TeamInstance> {
        let mut seen = HashSet::new();
        let mut remaining = Vec::new();

        for division in divisions.iter() {
            let Some(federation) = self.config.federation(division.federation) else {
                continue;
            };
            for (local_id, team) in &division.teams {
                let url = federation.team_url(local_id);
                if fetched_urls.contains(&url) || fetched_names.contains(&team.name) {
                    continue;
                }
                if seen.insert(url.clone()) {
                    remaining.push(TeamInstance {
                        name: team.name.clone(),
                        url,
                        federation: division.federation,
                    });
                }
            }
        }
        remaining
    }

    /// Every player named by a team roster or a division listing, once per federation-local id
    fn player_targets(&self, teams: &TeamCollection, divisions: &DivisionCollection) -> BTreeMap<LocalRef, String> {
        let mut targets = BTreeMap::new();

        for team in teams.iter() {
            for (local_id, entry) in &team.roster {
                targets
                    .entry(LocalRef::new(team.federation, local_id.clone()))
                    .or_insert_with(|| entry.url.clone());
            }
        }
        for division in divisions.iter() {
            let Some(federation) = self.config.federation(division.federation) else {
                continue;
            };
            for local_id in division.players.keys() {
                targets
                    .entry(LocalRef::new(division.federation, local_id.clone()))
                    .or_insert_with(|| federation.player_url(local_id));
            }
        }
        targets
    }

    /// Write each collection on its own; one failing does not stop the others
    fn persist(
        &self,
        teams: &TeamCollection,
        divisions: &DivisionCollection,
        players: &PlayerCollection,
    ) -> Vec<&'static str> {
        let results = [
            (TEAMS_FILE, self.store.save_teams(teams)),
            (DIVISIONS_FILE, self.store.save_divisions(divisions)),
            (PLAYERS_FILE, self.store.save_players(players)),
        ];

        results
            .into_iter()
            .filter_map(|(collection, result)| {
                result.err().map(|e| {
                    error!("{:#}", e);
                    collection
                })
            })
            .collect()
    }

    fn log_club_summary(&self, teams: &TeamCollection) {
        let mut names: Vec<String> = teams
            .iter()
            .map(|t| t.name.clone())
            .filter(|name| self.pattern.matches(name))
            .collect();
        sort_team_names(&mut names, &self.config.club.prefix);

        info!("Club teams:");
        for name in names {
            if let Some(team) = teams.get(&name) {
                info!(
                    "  {} ({}): {} matches, MP {}, BP {}, avg opponent {:.0}",
                    team.name,
                    team.federation,
                    team.matches.len(),
                    team.match_points,
                    team.board_points,
                    team.avg_opponent_rating
                );
            }
        }
    }
}

fn collect_division_refs(teams: &[Team]) -> BTreeSet<DivisionRef> {
    teams
        .iter()
        .filter_map(|team| {
            team.division_url.as_ref().map(|url| DivisionRef {
                url: url.clone(),
                federation: team.federation,
            })
        })
        .collect()
}

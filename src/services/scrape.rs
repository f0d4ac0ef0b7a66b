use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use log::debug;
use std::collections::BTreeMap;

use crate::cache::RoundDates;
use crate::config::AppConfig;
use crate::domain::{Division, DivisionRef, Game, LocalRef, Match, PlayerObservation, Team, TeamInstance};
use crate::extractors::{
    Fixture, PairingLookup, extract_division, extract_monthly_ratings, extract_opponent_rating,
    extract_player, extract_round_date, extract_team, ratings_url,
};
use crate::http::{Fetcher, PageSource};

/// Fetch-and-extract units of work, one per team, division or player
///
/// Each unit owns its sub-fetches (pairing pages, round pages, rating history)
/// and always returns a record, empty when its page could not be loaded.
pub struct Scraper<'a, S> {
    fetcher: &'a Fetcher<S>,
    config: &'a AppConfig,
    round_dates: RoundDates,
    today: NaiveDate,
}

impl<'a, S: PageSource> Scraper<'a, S> {
    pub fn new(fetcher: &'a Fetcher<S>, config: &'a AppConfig, today: NaiveDate) -> Self {
        Self {
            fetcher,
            config,
            round_dates: RoundDates::new(),
            today,
        }
    }

    pub async fn scrape_team(&self, instance: TeamInstance) -> Team {
        let mut team = Team::empty(&instance);
        let Some(federation) = self.config.federation(instance.federation) else {
            return team;
        };

        let content = self.fetcher.fetch_page(&instance.url).await;
        let page = extract_team(content.as_deref(), federation);

        team.division_url = page.division_url;
        team.match_points = page.match_points;
        team.board_points = page.board_points;
        team.roster = page.roster;

        let team_name = team.name.as_str();
        let lookups: Vec<(Fixture, PairingLookup)> = stream::iter(page.fixtures)
            .map(|fixture| async move {
                let (opponent, _) = fixture.opponent_for(team_name);
                let content = self.fetcher.fetch_page(&fixture.pairing_url).await;
                let lookup = extract_opponent_rating(content.as_deref(), &opponent);
                (fixture, lookup)
            })
            .buffered(self.config.concurrency.sub_fetches.max(1))
            .collect()
            .await;

        for (fixture, lookup) in lookups {
            let (opponent_name, location) = fixture.opponent_for(&team.name);
            match lookup {
                PairingLookup::Rated(rating) => {
                    team.matches.push(Match {
                        date: fixture.date,
                        opponent_name,
                        location,
                        result: fixture.result,
                    });
                    team.opponent_ratings_raw.push(rating);
                }
                PairingLookup::Ghost => {
                    debug!("  Ghost pairing for {} vs {}, skipping", team.name, opponent_name);
                }
                PairingLookup::Unresolved => {
                    debug!("  No opponent rating for {} vs {}, skipping", team.name, opponent_name);
                }
            }
        }

        team.recompute_average();
        team
    }

    pub async fn scrape_division(&self, reference: DivisionRef) -> Division {
        let content = self.fetcher.fetch_page(&reference.url).await;
        extract_division(content.as_deref(), &reference)
    }

    pub async fn scrape_player(&self, reference: LocalRef, url: String) -> PlayerObservation {
        let Some(federation) = self.config.federation(reference.federation) else {
            return PlayerObservation::empty(&reference);
        };

        let content = self.fetcher.fetch_page(&url).await;
        let mut player = extract_player(content.as_deref(), &reference, federation);

        let games = std::mem::take(&mut player.games);
        let (games, history) = futures::join!(
            self.resolve_game_dates(games),
            self.fetch_rating_history(player.universal_id.as_deref())
        );
        player.games = games;
        player.historical_ratings = history;
        player
    }

    async fn resolve_game_dates(&self, games: Vec<Game>) -> Vec<Game> {
        stream::iter(games)
            .map(|mut game| async move {
                if let Some(round_url) = &game.round_url {
                    game.date = self.round_date(round_url).await;
                }
                game
            })
            .buffered(self.config.concurrency.sub_fetches.max(1))
            .collect()
            .await
    }

    async fn round_date(&self, round_url: &str) -> Option<String> {
        if let Some(date) = self.round_dates.get(round_url) {
            return date;
        }
        let content = self.fetcher.fetch_page(round_url).await;
        let date = extract_round_date(content.as_deref());
        self.round_dates.insert(round_url, date.clone());
        date
    }

    async fn fetch_rating_history(&self, universal_id: Option<&str>) -> BTreeMap<String, u32> {
        let Some(universal_id) = universal_id else {
            return Default::default();
        };
        let url = ratings_url(&self.config.scraper.ratings_api_base, universal_id);
        let content = self.fetcher.fetch_text(&url).await;
        extract_monthly_ratings(content.as_deref(), self.today)
    }

    pub fn cached_round_dates(&self) -> usize {
        self.round_dates.len()
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Federation that assigned a local id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Federation {
    Knsb,
    Nosbo,
}

impl Federation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Federation::Knsb => "KNSB",
            Federation::Nosbo => "NOSBO",
        }
    }
}

impl fmt::Display for Federation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A federation-local id together with the federation that issued it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalRef {
    pub federation: Federation,
    pub local_id: String,
}

impl LocalRef {
    pub fn new(federation: Federation, local_id: impl Into<String>) -> Self {
        Self {
            federation,
            local_id: local_id.into(),
        }
    }
}

/// One listing of a team on one competition phase page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamInstance {
    pub name: String,
    pub url: String,
    pub federation: Federation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Home,
    Away,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub date: String,
    #[serde(rename = "opponent")]
    pub opponent_name: String,
    pub location: Location,
    pub result: String,
}

/// Team record, one per fetched instance until aggregation merges them by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub federation: Federation,
    pub division_url: Option<String>,
    pub match_points: f64,
    pub board_points: f64,
    #[serde(rename = "players", default)]
    pub roster: BTreeMap<String, RosterEntry>,
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub opponent_ratings_raw: Vec<u32>,
    #[serde(default)]
    pub avg_opponent_rating: f64,
    #[serde(default)]
    pub source_urls: Vec<String>,
}

impl Team {
    /// The record a team instance yields when nothing could be scraped
    pub fn empty(instance: &TeamInstance) -> Self {
        Self {
            name: instance.name.clone(),
            federation: instance.federation,
            division_url: None,
            match_points: 0.0,
            board_points: 0.0,
            roster: BTreeMap::new(),
            matches: Vec::new(),
            opponent_ratings_raw: Vec::new(),
            avg_opponent_rating: 0.0,
            source_urls: vec![instance.url.clone()],
        }
    }

    /// A team with neither roster nor matches is what a failed scrape leaves behind
    pub fn is_empty(&self) -> bool {
        self.roster.is_empty() && self.matches.is_empty()
    }

    pub fn recompute_average(&mut self) {
        self.avg_opponent_rating = mean_rating(&self.opponent_ratings_raw);
    }
}

/// Division link found on a team page
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DivisionRef {
    pub url: String,
    pub federation: Federation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionTeam {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionPlayer {
    pub name: String,
    pub elo: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub name: String,
    pub url: String,
    pub federation: Federation,
    pub teams: BTreeMap<String, DivisionTeam>,
    pub players: BTreeMap<String, DivisionPlayer>,
}

impl Division {
    pub fn empty(reference: &DivisionRef) -> Self {
        Self {
            name: String::new(),
            url: reference.url.clone(),
            federation: reference.federation,
            teams: BTreeMap::new(),
            players: BTreeMap::new(),
        }
    }
}

/// One game from a player's results table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    #[serde(rename = "round")]
    pub round_label: String,
    pub date: Option<String>,
    pub opponent_name: String,
    pub opponent_rating: Option<u32>,
    pub result: String,
    pub color: Option<String>,
    #[serde(skip)]
    pub round_url: Option<String>,
}

impl Game {
    /// Score this game contributes: `1` a win, `½` a draw, anything else nothing
    pub fn points(&self) -> f64 {
        match self.result.as_str() {
            "1" => 1.0,
            "½" | "0.5" | "0,5" => 0.5,
            _ => 0.0,
        }
    }
}

/// One scrape of a player page under one federation-local id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerObservation {
    pub federation: Federation,
    pub federation_id: String,
    pub universal_id: Option<String>,
    pub name: String,
    pub elo: Option<u32>,
    pub tpr: Option<i32>,
    pub w_we: Option<f64>,
    pub games_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub color_balance: Option<i32>,
    pub color_distribution: String,
    pub games: Vec<Game>,
    pub total_score: f64,
    pub opponent_ratings_raw: Vec<u32>,
    pub historical_ratings: BTreeMap<String, u32>,
}

impl PlayerObservation {
    pub fn empty(reference: &LocalRef) -> Self {
        Self {
            federation: reference.federation,
            federation_id: reference.local_id.clone(),
            universal_id: None,
            name: String::new(),
            elo: None,
            tpr: None,
            w_we: None,
            games_played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            color_balance: None,
            color_distribution: String::new(),
            games: Vec::new(),
            total_score: 0.0,
            opponent_ratings_raw: Vec::new(),
            historical_ratings: BTreeMap::new(),
        }
    }
}

/// A player merged across federations, keyed by universal id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub universal_id: String,
    pub name: String,
    pub elo: Option<u32>,
    pub tpr: Option<i32>,
    pub w_we: Option<f64>,
    pub games_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub color_balance: Option<i32>,
    pub color_distribution: String,
    pub games: Vec<Game>,
    pub total_score: f64,
    pub opponent_ratings_raw: Vec<u32>,
    pub avg_opponent_rating: f64,
    pub historical_ratings: BTreeMap<String, u32>,
    pub federation_ids: Vec<String>,
    pub federations: Vec<Federation>,
    pub teams_played_for: Vec<String>,
}

impl Player {
    pub fn recompute_average(&mut self) {
        self.avg_opponent_rating = mean_rating(&self.opponent_ratings_raw);
    }

    /// `(federation, local id)` pairs this player was observed under
    pub fn local_refs(&self) -> impl Iterator<Item = LocalRef> + '_ {
        self.federations
            .iter()
            .zip(&self.federation_ids)
            .map(|(federation, id)| LocalRef::new(*federation, id.clone()))
    }
}

pub fn mean_rating(ratings: &[u32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: u64 = ratings.iter().map(|&r| u64::from(r)).sum();
    sum as f64 / ratings.len() as f64
}

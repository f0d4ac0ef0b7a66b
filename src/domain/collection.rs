use log::debug;
use std::collections::BTreeMap;

use super::models::{Division, Player, PlayerObservation, Team};
use crate::aggregation::{membership::MembershipIndex, players, teams};

/// Teams merged by name
#[derive(Debug, Default)]
pub struct TeamCollection {
    teams: BTreeMap<String, Team>,
}

impl TeamCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(teams: BTreeMap<String, Team>) -> Self {
        Self { teams }
    }

    /// Merge a team record into the collection, recomputing its averages
    pub fn add(&mut self, team: Team) {
        match self.teams.get_mut(&team.name) {
            Some(existing) => teams::merge_into(existing, team),
            None => {
                let mut team = team;
                team.recompute_average();
                self.teams.insert(team.name.clone(), team);
            }
        }
    }

    /// Overwrite a team wholesale, used when a repaired record supersedes a failed one
    pub fn replace(&mut self, team: Team) {
        self.teams.insert(team.name.clone(), team);
    }

    pub fn get(&self, name: &str) -> Option<&Team> {
        self.teams.get(name)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    pub fn as_map(&self) -> &BTreeMap<String, Team> {
        &self.teams
    }

    pub fn into_map(self) -> BTreeMap<String, Team> {
        self.teams
    }
}

/// Divisions keyed by their page title
#[derive(Debug, Default)]
pub struct DivisionCollection {
    divisions: BTreeMap<String, Division>,
}

impl DivisionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nameless divisions are failed scrapes and are not kept
    pub fn add(&mut self, division: Division) -> bool {
        if division.name.is_empty() {
            debug!("Dropping division without a name: {}", division.url);
            return false;
        }
        self.divisions.insert(division.name.clone(), division);
        true
    }

    pub fn len(&self) -> usize {
        self.divisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.divisions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Division> {
        self.divisions.values()
    }

    pub fn as_map(&self) -> &BTreeMap<String, Division> {
        &self.divisions
    }
}

/// Players merged by universal id
#[derive(Debug, Default)]
pub struct PlayerCollection {
    players: BTreeMap<String, Player>,
    unresolved: usize,
}

impl PlayerCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an observation; returns false when it has no universal id and was dropped
    pub fn add(&mut self, observation: PlayerObservation) -> bool {
        let Some(universal_id) = observation.universal_id.clone() else {
            debug!(
                "Dropping {} player {} without universal id",
                observation.federation, observation.federation_id
            );
            self.unresolved += 1;
            return false;
        };

        match self.players.get_mut(&universal_id) {
            Some(existing) => players::merge_into(existing, observation),
            None => {
                let player = players::seed(universal_id.clone(), observation);
                self.players.insert(universal_id, player);
            }
        }
        true
    }

    /// Resolve every player's team memberships against the aggregated teams
    pub fn attach_memberships(&mut self, teams: &TeamCollection) {
        let index = MembershipIndex::build(teams);
        for player in self.players.values_mut() {
            player.teams_played_for = index.teams_for(player);
        }
    }

    pub fn unresolved_count(&self) -> usize {
        self.unresolved
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, universal_id: &str) -> Option<&Player> {
        self.players.get(universal_id)
    }

    pub fn as_map(&self) -> &BTreeMap<String, Player> {
        &self.players
    }
}

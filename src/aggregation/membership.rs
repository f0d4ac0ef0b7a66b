use std::collections::{BTreeSet, HashMap};

use crate::domain::{LocalRef, Player, TeamCollection};

/// Team name given to players whose ids appear in no roster
pub const UNKNOWN_TEAM: &str = "Unknown";

/// Inverse of all team rosters: federation-local player id to team names
pub struct MembershipIndex {
    teams_by_player: HashMap<LocalRef, BTreeSet<String>>,
}

impl MembershipIndex {
    pub fn build(teams: &TeamCollection) -> Self {
        let mut teams_by_player: HashMap<LocalRef, BTreeSet<String>> = HashMap::new();

        for team in teams.iter() {
            for local_id in team.roster.keys() {
                teams_by_player
                    .entry(LocalRef::new(team.federation, local_id.clone()))
                    .or_default()
                    .insert(team.name.clone());
            }
        }

        Self { teams_by_player }
    }

    /// Distinct, sorted names of every team whose roster holds one of the player's ids
    pub fn teams_for(&self, player: &Player) -> Vec<String> {
        let names: BTreeSet<&String> = player
            .local_refs()
            .filter_map(|local| self.teams_by_player.get(&local))
            .flatten()
            .collect();

        if names.is_empty() {
            vec![UNKNOWN_TEAM.to_string()]
        } else {
            names.into_iter().cloned().collect()
        }
    }
}

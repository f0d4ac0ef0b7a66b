use std::collections::HashSet;

use crate::domain::{Game, Player, PlayerObservation};

/// Start an aggregated player from its first observation
pub fn seed(universal_id: String, observation: PlayerObservation) -> Player {
    let mut player = Player {
        universal_id,
        name: observation.name,
        elo: observation.elo,
        tpr: observation.tpr,
        w_we: observation.w_we,
        games_played: observation.games_played,
        wins: observation.wins,
        draws: observation.draws,
        losses: observation.losses,
        color_balance: observation.color_balance,
        color_distribution: observation.color_distribution,
        games: observation.games,
        total_score: observation.total_score,
        opponent_ratings_raw: observation.opponent_ratings_raw,
        avg_opponent_rating: 0.0,
        historical_ratings: observation.historical_ratings,
        federation_ids: vec![observation.federation_id],
        federations: vec![observation.federation],
        teams_played_for: Vec::new(),
    };
    player.recompute_average();
    player
}

/// Fold a further observation of the same person into `existing`
///
/// Score sums and rating lists concatenate. Games are unioned by round and
/// opponent, keeping the first occurrence; monthly ratings keep the first
/// value seen per month. Scalar statistics stay those of the seed.
pub fn merge_into(existing: &mut Player, observation: PlayerObservation) {
    existing.federation_ids.push(observation.federation_id);
    existing.federations.push(observation.federation);
    existing.total_score += observation.total_score;
    existing
        .opponent_ratings_raw
        .extend(observation.opponent_ratings_raw);

    union_games(&mut existing.games, observation.games);
    for (month, rating) in observation.historical_ratings {
        existing.historical_ratings.entry(month).or_insert(rating);
    }
    if existing.name.is_empty() {
        existing.name = observation.name;
    }
    if existing.elo.is_none() {
        existing.elo = observation.elo;
    }

    existing.recompute_average();
}

fn union_games(games: &mut Vec<Game>, incoming: Vec<Game>) {
    let mut seen: HashSet<(String, String)> = games.iter().map(game_key).collect();
    for game in incoming {
        if seen.insert(game_key(&game)) {
            games.push(game);
        }
    }
}

fn game_key(game: &Game) -> (String, String) {
    (game.round_label.clone(), game.opponent_name.clone())
}

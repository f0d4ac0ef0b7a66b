use log::debug;

use crate::domain::Team;

/// Fold another instance of the same team into `existing`
///
/// Matches and ratings concatenate, rosters union with the incoming entry
/// winning on duplicate ids. An instance whose source URL was already merged
/// is the same listing seen twice and contributes nothing.
pub fn merge_into(existing: &mut Team, incoming: Team) {
    if is_already_merged(existing, &incoming) {
        debug!("Skipping duplicate instance of team {}", incoming.name);
        return;
    }

    existing.matches.extend(incoming.matches);
    existing.roster.extend(incoming.roster);
    existing.opponent_ratings_raw.extend(incoming.opponent_ratings_raw);

    if existing.division_url.is_none() {
        existing.division_url = incoming.division_url;
    }
    if existing.match_points == 0.0 {
        existing.match_points = incoming.match_points;
    }
    if existing.board_points == 0.0 {
        existing.board_points = incoming.board_points;
    }
    for url in incoming.source_urls {
        if !existing.source_urls.contains(&url) {
            existing.source_urls.push(url);
        }
    }

    existing.recompute_average();
}

fn is_already_merged(existing: &Team, incoming: &Team) -> bool {
    !incoming.source_urls.is_empty()
        && incoming
            .source_urls
            .iter()
            .all(|url| existing.source_urls.contains(url))
}

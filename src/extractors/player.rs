use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashMap;
use std::sync::LazyLock;

use super::common::{
    card_table, has_class, labelled_parent_value, next_sibling_element, parse_decimal, parse_document,
    parse_int, selector, text_of,
};
use crate::config::FederationConfig;
use crate::domain::{Game, LocalRef, PlayerObservation};

static UNIVERSAL_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ratingviewer\.nl/list/latest/players/(\d+)/").expect("Failed to compile universal id regex")
});

static OPPONENT_RATING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{3,4})\)").expect("Failed to compile opponent rating regex"));

const STATS_HEADING: &str = "Statistieken";
const GAMES_HEADING: &str = "Partijen";
const COLOR_DISTRIBUTION_LABEL: &str = "Kleurverdeling";
const MIN_GAME_CELLS: usize = 3;

/// Parse a player detail page. Round dates and historical ratings need
/// further fetches and are filled in by the caller.
pub fn extract_player(
    content: Option<&str>,
    reference: &LocalRef,
    federation: &FederationConfig,
) -> PlayerObservation {
    let mut player = PlayerObservation::empty(reference);
    let Some(content) = content else {
        return player;
    };
    let document = parse_document(content);

    extract_identity(&document, &mut player);
    extract_statistics(&document, &mut player);

    player.games = extract_games(&document, federation);
    player.total_score = player.games.iter().map(Game::points).sum();
    player.opponent_ratings_raw = player.games.iter().filter_map(|g| g.opponent_rating).collect();
    player
}

fn extract_identity(document: &Html, player: &mut PlayerObservation) {
    if let Some(name) = document
        .select(&selector("div.col-lg-4.offset-lg-4.text-center"))
        .next()
    {
        player.name = text_of(name);
    }

    player.universal_id = document
        .select(&selector("a[href*='ratingviewer.nl/list/latest/players/']"))
        .filter_map(|link| link.value().attr("href"))
        .find_map(|href| UNIVERSAL_ID_REGEX.captures(href))
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string());

    player.elo = document
        .select(&selector("b"))
        .find(|label| text_of(*label) == "Rating")
        .and_then(|label| labelled_parent_value(label, "Rating"))
        .and_then(|value| parse_int(&value));
}

fn extract_statistics(document: &Html, player: &mut PlayerObservation) {
    let Some(table) = card_table(document, STATS_HEADING) else {
        return;
    };

    let cell_selector = selector("td");
    let stats: HashMap<String, String> = table
        .select(&selector("tbody tr"))
        .filter_map(|row| {
            let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
            match cells.as_slice() {
                [label, value] => Some((text_of(*label), text_of(*value))),
                _ => None,
            }
        })
        .collect();
    let stat = |label: &str| stats.get(label).map(String::as_str);

    player.tpr = stat("TPR").and_then(parse_int);
    player.w_we = stat("W-We").and_then(parse_decimal);
    player.games_played = stat("Gespeeld").and_then(parse_int).unwrap_or(0);
    player.wins = stat("Gewonnen").and_then(parse_int).unwrap_or(0);
    player.draws = stat("Remise").and_then(parse_int).unwrap_or(0);
    player.losses = stat("Verloren").and_then(parse_int).unwrap_or(0);
    player.color_balance = stat("Kleursaldo").and_then(parse_int);
    player.color_distribution = color_distribution(table);
}

/// One flag per game: `b` for a filled icon, `w` otherwise
fn color_distribution(table: ElementRef) -> String {
    let Some(label) = table
        .select(&selector("td"))
        .find(|cell| text_of(*cell) == COLOR_DISTRIBUTION_LABEL)
    else {
        return String::new();
    };
    let Some(cell) = next_sibling_element(label) else {
        return String::new();
    };

    cell.select(&selector("i"))
        .map(|icon| if has_class(icon, "fas") { 'b' } else { 'w' })
        .collect()
}

fn extract_games(document: &Html, federation: &FederationConfig) -> Vec<Game> {
    let Some(table) = card_table(document, GAMES_HEADING) else {
        return Vec::new();
    };

    let cell_selector = selector("td");
    let link_selector = selector("a");
    table
        .select(&selector("tbody tr"))
        .filter_map(|row| {
            let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
            if cells.len() < MIN_GAME_CELLS {
                return None;
            }
            let round_url = cells[0]
                .select(&link_selector)
                .next()
                .and_then(|link| link.value().attr("href"))
                .map(|href| federation.absolute(href));
            let (opponent_name, opponent_rating) = split_opponent(&text_of(cells[1]));

            Some(Game {
                round_label: text_of(cells[0]),
                date: None,
                opponent_name,
                opponent_rating,
                result: text_of(cells[2]),
                color: cells.get(3).map(|cell| text_of(*cell)).filter(|c| !c.is_empty()),
                round_url,
            })
        })
        .collect()
}

/// Split `"Name (1234)"` into the name and its rating
fn split_opponent(text: &str) -> (String, Option<u32>) {
    let name = text.split('(').next().unwrap_or_default().trim().to_string();
    let rating = OPPONENT_RATING_REGEX
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|rating| rating.as_str().parse().ok());
    (name, rating)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Federation;

    const PLAYER_PAGE: &str = r#"
        <html><body>
            <div class="row"><div class="col-lg-4 offset-lg-4 text-center">Alice Janssen</div></div>
            <a href="https://ratingviewer.nl/list/latest/players/8012345/">Ratingviewer</a>
            <p><b>Rating</b> 1850</p>
            <div class="card">
                <div class="card-header"><span class="h3">Statistieken</span></div>
                <table class="table">
                    <tbody>
                        <tr><td>TPR</td><td>1902</td></tr>
                        <tr><td>W-We</td><td>0,85</td></tr>
                        <tr><td>Gespeeld</td><td>3</td></tr>
                        <tr><td>Gewonnen</td><td>1</td></tr>
                        <tr><td>Remise</td><td>1</td></tr>
                        <tr><td>Verloren</td><td>1</td></tr>
                        <tr><td>Kleursaldo</td><td>-1</td></tr>
                        <tr><td>Kleurverdeling</td><td><i class="fas fa-circle"></i><i class="far fa-circle"></i><i class="fas fa-circle"></i></td></tr>
                    </tbody>
                </table>
            </div>
            <div class="card">
                <div class="card-header"><span class="h3">Partijen</span></div>
                <table class="table">
                    <tbody>
                        <tr><td><a href="/rounds/view/501">Ronde 1</a></td><td>Bob Smit (1720)</td><td>1</td><td>w</td></tr>
                        <tr><td><a href="/rounds/view/502">Ronde 2</a></td><td>Carl de Vries (1905)</td><td>½</td><td>b</td></tr>
                        <tr><td>Ronde 3</td><td>Dana (onbekend)</td><td>0</td></tr>
                        <tr><td>Ronde 4</td><td>bye</td></tr>
                    </tbody>
                </table>
            </div>
        </body></html>
    "#;

    fn knsb() -> FederationConfig {
        FederationConfig::new(Federation::Knsb, "https://knsb.example", "/scores/index/54")
    }

    fn extract(content: Option<&str>) -> PlayerObservation {
        extract_player(content, &LocalRef::new(Federation::Knsb, "101"), &knsb())
    }

    #[test]
    fn test_identity_and_rating() {
        let player = extract(Some(PLAYER_PAGE));

        assert_eq!(player.name, "Alice Janssen");
        assert_eq!(player.universal_id.as_deref(), Some("8012345"));
        assert_eq!(player.elo, Some(1850));
        assert_eq!(player.federation_id, "101");
    }

    #[test]
    fn test_statistics_table() {
        let player = extract(Some(PLAYER_PAGE));

        assert_eq!(player.tpr, Some(1902));
        assert_eq!(player.w_we, Some(0.85));
        assert_eq!((player.games_played, player.wins, player.draws, player.losses), (3, 1, 1, 1));
        assert_eq!(player.color_balance, Some(-1));
        assert_eq!(player.color_distribution, "bwb");
    }

    #[test]
    fn test_games_and_derived_totals() {
        let player = extract(Some(PLAYER_PAGE));

        assert_eq!(player.games.len(), 3);
        assert_eq!(player.games[0].opponent_name, "Bob Smit");
        assert_eq!(player.games[0].opponent_rating, Some(1720));
        assert_eq!(player.games[0].round_url.as_deref(), Some("https://knsb.example/rounds/view/501"));
        assert_eq!(player.games[2].opponent_rating, None);
        assert_eq!(player.games[2].color, None);
        assert!(player.games[2].round_url.is_none());

        assert_eq!(player.total_score, 1.5);
        assert_eq!(player.opponent_ratings_raw, vec![1720, 1905]);
    }

    #[test]
    fn test_page_without_profile_link() {
        let player = extract(Some("<html><body><p>Geen speler</p></body></html>"));

        assert!(player.universal_id.is_none());
        assert!(player.games.is_empty());
        assert_eq!(player.games_played, 0);
        assert_eq!(extract(None), PlayerObservation::empty(&LocalRef::new(Federation::Knsb, "101")));
    }
}

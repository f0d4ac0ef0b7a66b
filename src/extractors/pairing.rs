use scraper::ElementRef;

use super::common::{next_sibling_element, parse_document, parse_int, selector, text_of};

/// Name the site shows in a board slot with no player assigned
pub const GHOST_PLAYER: &str = "NN";

const AVERAGE_RATING_LABEL: &str = "Gemiddelde Rating:";

/// What a pairing page says about the opponent's strength
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingLookup {
    Rated(u32),
    /// Every board holds the placeholder; no match was played
    Ghost,
    /// Expected structure missing or the opponent is not on the page
    Unresolved,
}

impl PairingLookup {
    pub fn rating(self) -> Option<u32> {
        match self {
            PairingLookup::Rated(rating) => Some(rating),
            _ => None,
        }
    }
}

/// Find the average rating the opponent fielded in this pairing
pub fn extract_opponent_rating(content: Option<&str>, opponent_name: &str) -> PairingLookup {
    let Some(content) = content else {
        return PairingLookup::Unresolved;
    };
    let document = parse_document(content);

    let Some(table) = document
        .select(&selector("table"))
        .find(|table| table.value().classes().any(|c| c.contains("table-striped")))
    else {
        return PairingLookup::Unresolved;
    };

    if is_ghost_pairing(table) {
        return PairingLookup::Ghost;
    }

    let Some(column) = opponent_column(table, opponent_name) else {
        return PairingLookup::Unresolved;
    };

    average_rating_in_column(table, column).map_or(PairingLookup::Unresolved, PairingLookup::Rated)
}

fn is_ghost_pairing(table: ElementRef) -> bool {
    let names: Vec<String> = table
        .select(&selector("tbody a[href*='/players/view/']"))
        .map(text_of)
        .collect();
    !names.is_empty() && names.iter().all(|name| name == GHOST_PLAYER)
}

fn opponent_column(table: ElementRef, opponent_name: &str) -> Option<usize> {
    table
        .select(&selector("thead a[href*='/teams/view/']"))
        .position(|link| text_of(link) == opponent_name)
}

fn average_rating_in_column(table: ElementRef, column: usize) -> Option<u32> {
    let footer = table.select(&selector("tfoot")).next()?;
    let label = footer
        .select(&selector("th"))
        .filter(|th| text_of(*th).contains(AVERAGE_RATING_LABEL))
        .nth(column)?;
    let value = next_sibling_element(label).filter(|cell| cell.value().name() == "th")?;
    parse_int::<u32>(&text_of(value)).filter(|&rating| rating > 0)
}

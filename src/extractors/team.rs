use scraper::{ElementRef, Html};
use std::collections::BTreeMap;

use super::common::{
    labelled_parent_value, local_id_from_href, parse_decimal, parse_document, selector, text_of,
};
use crate::config::FederationConfig;
use crate::domain::{Location, RosterEntry};

const FIXTURE_TABLE_CLASS: &str = "table table-striped table-bordered";
const FIXTURE_CELLS: usize = 5;

/// One row of a team's fixture list that links to a pairing page
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub date: String,
    pub home: String,
    pub away: String,
    pub result: String,
    pub pairing_url: String,
}

impl Fixture {
    /// Opponent name and venue from the point of view of `team_name`
    pub fn opponent_for(&self, team_name: &str) -> (String, Location) {
        if self.home == team_name {
            (self.away.clone(), Location::Home)
        } else {
            (self.home.clone(), Location::Away)
        }
    }
}

/// Everything a team detail page yields before pairing pages are visited
#[derive(Debug, Default)]
pub struct TeamPage {
    pub division_url: Option<String>,
    pub match_points: f64,
    pub board_points: f64,
    pub roster: BTreeMap<String, RosterEntry>,
    pub fixtures: Vec<Fixture>,
}

pub fn extract_team(content: Option<&str>, federation: &FederationConfig) -> TeamPage {
    let Some(content) = content else {
        return TeamPage::default();
    };
    let document = parse_document(content);

    let (match_points, board_points) = extract_points(&document);
    TeamPage {
        division_url: extract_division_url(&document, federation),
        match_points,
        board_points,
        roster: extract_roster(&document, federation),
        fixtures: extract_fixtures(&document, federation),
    }
}

fn extract_division_url(document: &Html, federation: &FederationConfig) -> Option<String> {
    document
        .select(&selector("a[href*='/divisions/view/']"))
        .next()
        .and_then(|link| link.value().attr("href"))
        .map(|href| federation.absolute(href))
}

fn extract_points(document: &Html) -> (f64, f64) {
    let mut match_points = 0.0;
    let mut board_points = 0.0;

    for label in document.select(&selector("b")) {
        let label_text = text_of(label);
        let target = match label_text.as_str() {
            "MP" => &mut match_points,
            "BP" => &mut board_points,
            _ => continue,
        };
        if let Some(value) = labelled_parent_value(label, &label_text).and_then(|v| parse_decimal(&v)) {
            *target = value;
        }
    }
    (match_points, board_points)
}

fn extract_roster(document: &Html, federation: &FederationConfig) -> BTreeMap<String, RosterEntry> {
    let mut roster = BTreeMap::new();
    let Some(table) = document.select(&selector("table#DataTables_Table_0")).next() else {
        return roster;
    };

    let link_selector = selector("a[href*='/players/view/']");
    for row in table.select(&selector("tbody tr")) {
        let Some(link) = row.select(&link_selector).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if let Some(local_id) = local_id_from_href(href) {
            roster.insert(
                local_id,
                RosterEntry {
                    name: text_of(link),
                    url: federation.absolute(href),
                },
            );
        }
    }
    roster
}

fn extract_fixtures(document: &Html, federation: &FederationConfig) -> Vec<Fixture> {
    let Some(table) = document
        .select(&selector("table"))
        .find(|table| table.value().attr("class").map(str::trim) == Some(FIXTURE_TABLE_CLASS))
    else {
        return Vec::new();
    };

    table
        .select(&selector("tbody tr"))
        .filter_map(|row| parse_fixture_row(row, federation))
        .collect()
}

fn parse_fixture_row(row: ElementRef, federation: &FederationConfig) -> Option<Fixture> {
    let cells: Vec<ElementRef> = row.select(&selector("td")).collect();
    if cells.len() != FIXTURE_CELLS {
        return None;
    }
    let href = cells[4]
        .select(&selector("a"))
        .next()
        .and_then(|link| link.value().attr("href"))?;

    Some(Fixture {
        date: text_of(cells[1]),
        home: text_of(cells[2]),
        away: text_of(cells[3]),
        result: text_of(cells[4]),
        pairing_url: federation.absolute(href),
    })
}

use scraper::{ElementRef, Html};
use std::collections::BTreeMap;

use super::common::{
    first_after, local_id_from_href, next_sibling_element, parse_document, parse_int, selector, text_of,
};
use crate::domain::{Division, DivisionPlayer, DivisionRef, DivisionTeam};

const TEAMS_HEADING: &str = "Teams";

pub fn extract_division(content: Option<&str>, reference: &DivisionRef) -> Division {
    let mut division = Division::empty(reference);
    let Some(content) = content else {
        return division;
    };
    let document = parse_document(content);

    if let Some(header) = document.select(&selector("h1")).next() {
        division.name = text_of(header);
    }
    division.teams = extract_teams(&document);
    division.players = extract_players(&document);
    division
}

fn extract_teams(document: &Html) -> BTreeMap<String, DivisionTeam> {
    let Some(heading) = document
        .select(&selector("h2"))
        .find(|h2| text_of(*h2) == TEAMS_HEADING)
    else {
        return BTreeMap::new();
    };
    let Some(table) = first_after(document, heading, "table") else {
        return BTreeMap::new();
    };

    linked_rows(table, "a[href*='/teams/view/']")
        .into_iter()
        .map(|(local_id, link, _)| (local_id, DivisionTeam { name: text_of(link) }))
        .collect()
}

fn extract_players(document: &Html) -> BTreeMap<String, DivisionPlayer> {
    let Some(table) = document.select(&selector("table.dataTable")).next() else {
        return BTreeMap::new();
    };

    linked_rows(table, "a[href*='/players/view/']")
        .into_iter()
        .map(|(local_id, link, cell)| {
            let elo = next_sibling_element(cell).and_then(|next| parse_int::<u32>(&text_of(next)));
            (local_id, DivisionPlayer { name: text_of(link), elo })
        })
        .collect()
}

/// Body rows holding a matching link, as (local id, link, cell containing the link)
fn linked_rows<'a>(table: ElementRef<'a>, link_css: &str) -> Vec<(String, ElementRef<'a>, ElementRef<'a>)> {
    let link_selector = selector(link_css);
    let cell_selector = selector("td");
    table
        .select(&selector("tbody tr"))
        .filter_map(|row| {
            let (cell, link) = row
                .select(&cell_selector)
                .find_map(|cell| cell.select(&link_selector).next().map(|link| (cell, link)))?;
            let local_id = local_id_from_href(link.value().attr("href")?)?;
            Some((local_id, link, cell))
        })
        .collect()
}

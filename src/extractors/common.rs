use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static VIEW_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/view/(\d+)").expect("Failed to compile view id regex"));

pub fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Failed to parse static selector")
}

pub fn parse_document(content: &str) -> Html {
    Html::parse_document(content)
}

/// Concatenated text of an element with each text node trimmed
pub fn text_of(element: ElementRef) -> String {
    element.text().map(str::trim).collect()
}

/// Federation-local id from a `/{resource}/view/{id}` href
pub fn local_id_from_href(href: &str) -> Option<String> {
    VIEW_ID_REGEX
        .captures_iter(href)
        .last()
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}

/// Parse a decimal that may use a comma as separator
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse().ok()
}

pub fn parse_int<T: std::str::FromStr>(text: &str) -> Option<T> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse().ok()
}

pub fn parent_element(element: ElementRef) -> Option<ElementRef> {
    element.parent().and_then(ElementRef::wrap)
}

pub fn next_sibling_element(element: ElementRef) -> Option<ElementRef> {
    element.next_siblings().find_map(ElementRef::wrap)
}

pub fn has_class(element: ElementRef, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Closest ancestor with the given tag name and class
pub fn ancestor_with_class<'a>(element: ElementRef<'a>, tag: &str, class: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == tag && has_class(*e, class))
}

/// First element named `tag` that follows `anchor` in document order
pub fn first_after<'a>(document: &'a Html, anchor: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .skip_while(|node| node.id() != anchor.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == tag && !is_inside(*e, anchor))
}

fn is_inside(element: ElementRef, container: ElementRef) -> bool {
    element.ancestors().any(|node| node.id() == container.id())
}

/// Text of the parent of a `<b>label</b>`-style field with the label removed once
pub fn labelled_parent_value(label: ElementRef, label_text: &str) -> Option<String> {
    let parent = parent_element(label)?;
    Some(text_of(parent).replacen(label_text, "", 1).trim().to_string())
}

/// Find a card section by the text of its `span.h3` heading and return its first table
pub fn card_table<'a>(document: &'a Html, heading: &str) -> Option<ElementRef<'a>> {
    let heading_selector = selector("span.h3");
    let table_selector = selector("table");

    let header = document
        .select(&heading_selector)
        .find(|span| text_of(*span) == heading)?;
    let card = ancestor_with_class(header, "div", "card")?;
    card.select(&table_selector).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_id_from_href() {
        assert_eq!(local_id_from_href("/players/view/1234").as_deref(), Some("1234"));
        assert_eq!(
            local_id_from_href("https://knsb.netstand.nl/teams/view/77?tab=2").as_deref(),
            Some("77")
        );
        assert_eq!(local_id_from_href("/players/index"), None);
    }

    #[test]
    fn test_decimal_with_comma() {
        assert_eq!(parse_decimal(" 12,5 "), Some(12.5));
        assert_eq!(parse_decimal("7.0"), Some(7.0));
        assert_eq!(parse_decimal("-"), None);
    }

    #[test]
    fn test_first_after_skips_to_following_table() {
        let html = Html::parse_document(
            r#"<div><table id="a"></table><h2>Teams</h2><p>intro</p><table id="b"></table></div>"#,
        );
        let h2 = html.select(&selector("h2")).next().unwrap();

        let table = first_after(&html, h2, "table").unwrap();

        assert_eq!(table.value().attr("id"), Some("b"));
    }
}

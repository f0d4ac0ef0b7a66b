use super::common::{labelled_parent_value, next_sibling_element, parse_document, selector, text_of};

const DATE_LABELS: [&str; 3] = ["Startdatum", "Start date", "Datum"];

/// Start date shown on a round detail page
pub fn extract_round_date(content: Option<&str>) -> Option<String> {
    let document = parse_document(content?);
    let label_selector = selector("th, td, b, dt");

    DATE_LABELS.iter().find_map(|&wanted| {
        document
            .select(&label_selector)
            .filter(|label| text_of(*label).trim_end_matches(':') == wanted)
            .find_map(|label| {
                let value = match label.value().name() {
                    "b" => labelled_parent_value(label, &text_of(label)),
                    _ => next_sibling_element(label).map(text_of),
                }?;
                let value = value.trim_start_matches(':').trim().to_string();
                (!value.is_empty()).then_some(value)
            })
    })
}

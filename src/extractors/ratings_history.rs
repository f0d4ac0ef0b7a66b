use chrono::{DateTime, Months, NaiveDate, NaiveDateTime};
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;

const WINDOW_MONTHS: u32 = 12;

#[derive(Debug, Deserialize)]
struct RatingEntry {
    moment: String,
    rating: f64,
}

pub fn ratings_url(api_base: &str, universal_id: &str) -> String {
    format!("{}/metrics/forRelatienr/{}.json", api_base.trim_end_matches('/'), universal_id)
}

/// Bucket a ratings API response by `YYYY-MM`, keeping the first entry seen
/// per month within the trailing twelve months before `today`
pub fn extract_monthly_ratings(content: Option<&str>, today: NaiveDate) -> BTreeMap<String, u32> {
    let mut monthly = BTreeMap::new();
    let Some(content) = content else {
        return monthly;
    };

    let entries: Vec<serde_json::Value> = match serde_json::from_str(content) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Ratings response is not a JSON list: {}", e);
            return monthly;
        }
    };
    let cutoff = today.checked_sub_months(Months::new(WINDOW_MONTHS)).unwrap_or(NaiveDate::MIN);

    for value in entries {
        let Ok(entry) = serde_json::from_value::<RatingEntry>(value) else {
            continue;
        };
        let Some(date) = parse_moment(&entry.moment) else {
            continue;
        };
        if date < cutoff || !entry.rating.is_finite() || entry.rating < 0.0 {
            continue;
        }
        monthly
            .entry(date.format("%Y-%m").to_string())
            .or_insert(entry.rating.round() as u32);
    }
    monthly
}

fn parse_moment(moment: &str) -> Option<NaiveDate> {
    let moment = moment.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(moment) {
        return Some(timestamp.date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(moment, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(timestamp.date());
    }
    NaiveDate::parse_from_str(moment, "%Y-%m-%d").ok()
}

//! Display order for club teams named `{prefix} {numeral}`
//!
//! Arabic numerals sort before roman ones, each by numeric value; anything
//! else (no suffix, mixed numerals) sorts last. Ties fall back to the name.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Suffix {
    Arabic(u32),
    Roman(u32),
    Other,
}

pub fn compare_team_names(a: &str, b: &str, prefix: &str) -> Ordering {
    suffix_of(a, prefix)
        .cmp(&suffix_of(b, prefix))
        .then_with(|| a.cmp(b))
}

pub fn sort_team_names(names: &mut [String], prefix: &str) {
    names.sort_by(|a, b| compare_team_names(a, b, prefix));
}

fn suffix_of(name: &str, prefix: &str) -> Suffix {
    let Some(rest) = strip_prefix_ignore_case(name.trim(), prefix) else {
        return Suffix::Other;
    };
    let Some(token) = rest.split_whitespace().next() else {
        return Suffix::Other;
    };

    if let Ok(value) = token.parse::<u32>() {
        return Suffix::Arabic(value);
    }
    roman_value(token).map_or(Suffix::Other, Suffix::Roman)
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &name[prefix.len()..])
}

fn roman_value(token: &str) -> Option<u32> {
    let digits = token
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'I' => Some(1),
            'V' => Some(5),
            'X' => Some(10),
            'L' => Some(50),
            'C' => Some(100),
            'D' => Some(500),
            'M' => Some(1000),
            _ => None,
        })
        .collect::<Option<Vec<u32>>>()?;

    let mut total = 0;
    for (i, &value) in digits.iter().enumerate() {
        match digits.get(i + 1) {
            Some(&next) if next > value => total -= value as i64,
            _ => total += value as i64,
        }
    }
    u32::try_from(total).ok().filter(|&v| v > 0)
}

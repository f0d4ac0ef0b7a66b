use std::collections::HashMap;
use std::sync::Mutex;

/// Run-scoped memo of round page dates, keyed by round URL
///
/// A round's date is the same for every game played in it, so each round
/// page needs fetching once per run. Failed lookups are remembered as `None`.
#[derive(Debug, Default)]
pub struct RoundDates {
    dates: Mutex<HashMap<String, Option<String>>>,
}

impl RoundDates {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Some(..)` when the round was looked up before, whatever the outcome
    pub fn get(&self, round_url: &str) -> Option<Option<String>> {
        self.lock().get(round_url).cloned()
    }

    pub fn insert(&self, round_url: &str, date: Option<String>) {
        self.lock().insert(round_url.to_string(), date);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Option<String>>> {
        self.dates.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remembers_hits_and_misses() {
        let dates = RoundDates::new();
        assert!(dates.get("https://knsb.example/rounds/view/1").is_none());

        dates.insert("https://knsb.example/rounds/view/1", Some("12-10-2025".to_string()));
        dates.insert("https://knsb.example/rounds/view/2", None);

        assert_eq!(
            dates.get("https://knsb.example/rounds/view/1"),
            Some(Some("12-10-2025".to_string()))
        );
        assert_eq!(dates.get("https://knsb.example/rounds/view/2"), Some(None));
        assert_eq!(dates.len(), 2);
    }
}

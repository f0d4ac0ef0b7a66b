use log::info;

use super::models::{Division, PlayerObservation, Team};

/// Whether a scrape outcome carries any data, or is the empty shape of a failure
pub trait HasData {
    fn has_data(&self) -> bool;
}

impl HasData for Team {
    fn has_data(&self) -> bool {
        !self.is_empty()
    }
}

impl HasData for Division {
    fn has_data(&self) -> bool {
        !self.name.is_empty()
    }
}

impl HasData for PlayerObservation {
    fn has_data(&self) -> bool {
        !self.name.is_empty() || self.universal_id.is_some()
    }
}

/// Track progress of one crawl stage
pub struct StageProgress {
    stage: &'static str,
    total: usize,
    populated: usize,
    empty: usize,
}

impl StageProgress {
    pub fn new(stage: &'static str, total: usize) -> Self {
        Self {
            stage,
            total,
            populated: 0,
            empty: 0,
        }
    }

    pub fn record<T: HasData>(&mut self, outcome: &T) {
        if outcome.has_data() {
            self.populated += 1;
        } else {
            self.empty += 1;
        }
        self.log_progress();
    }

    pub fn current_count(&self) -> usize {
        self.populated + self.empty
    }

    pub fn empty_count(&self) -> usize {
        self.empty
    }

    fn log_progress(&self) {
        let current = self.current_count();
        if should_log(current, self.total) {
            info!(
                "  → {}: {}/{} ({} with data, {} empty)",
                self.stage, current, self.total, self.populated, self.empty
            );
        }
    }
}

fn should_log(current: usize, total: usize) -> bool {
    is_milestone(current) || is_complete(current, total)
}

fn is_milestone(count: usize) -> bool {
    count % 10 == 0
}

fn is_complete(current: usize, total: usize) -> bool {
    current == total
}

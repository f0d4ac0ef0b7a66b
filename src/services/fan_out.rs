use futures::stream::{self, StreamExt};
use log::warn;

use crate::domain::{HasData, StageProgress};

/// Run `work` over `items` with at most `width` in flight, collecting every
/// outcome once the whole stage has drained
///
/// Outcomes arrive in completion order; callers merge them by key.
pub async fn fan_out<I, T, F, Fut>(stage: &'static str, items: Vec<I>, width: usize, work: F) -> Vec<T>
where
    F: FnMut(I) -> Fut,
    Fut: Future<Output = T>,
    T: HasData,
{
    let mut progress = StageProgress::new(stage, items.len());
    let mut outcomes = Vec::with_capacity(items.len());

    let mut in_flight = stream::iter(items).map(work).buffer_unordered(width.max(1));
    while let Some(outcome) = in_flight.next().await {
        progress.record(&outcome);
        outcomes.push(outcome);
    }

    if progress.empty_count() > 0 {
        warn!("  → {}: {} of {} came back empty", stage, progress.empty_count(), progress.current_count());
    }
    outcomes
}

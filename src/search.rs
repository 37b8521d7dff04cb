use std::collections::BTreeSet;
use tracing::debug;

use crate::data::InteractionTable;
use crate::splits::user_groups;
use crate::types::Timestamp;

/// Score every candidate threshold of `table`.
///
/// A candidate is any timestamp present in the data. Its score is the number of
/// users with at least `min_below` rows strictly before it and at least `min_over`
/// rows at or after it. Results are ordered by ascending timestamp.
pub fn score_timestamps(
    table: &InteractionTable,
    min_below: usize,
    min_over: usize,
) -> Vec<(Timestamp, usize)> {
    let records = table.records();
    let per_user: Vec<Vec<Timestamp>> = user_groups(table)
        .into_values()
        .map(|rows| {
            let mut stamps: Vec<Timestamp> =
                rows.iter().map(|&idx| records[idx].timestamp).collect();
            stamps.sort_unstable();
            stamps
        })
        .collect();

    let candidates: BTreeSet<Timestamp> = records.iter().map(|r| r.timestamp).collect();
    candidates
        .into_iter()
        .map(|ts| {
            let score = per_user
                .iter()
                .filter(|stamps| {
                    let below = stamps.partition_point(|&value| value < ts);
                    let over = stamps.len() - below;
                    below >= min_below && over >= min_over
                })
                .count();
            (ts, score)
        })
        .collect()
}

/// Threshold with the highest score; ties resolve to the largest timestamp.
///
/// Returns `None` only for an empty table.
pub fn search_best_timestamp(
    table: &InteractionTable,
    min_below: usize,
    min_over: usize,
) -> Option<Timestamp> {
    let scores = score_timestamps(table, min_below, min_over);
    let best = scores
        .iter()
        .copied()
        .max_by_key(|&(ts, score)| (score, ts));
    if let Some((ts, score)) = best {
        debug!(
            timestamp = ts,
            users = score,
            candidates = scores.len(),
            "best timestamp selected"
        );
    }
    best.map(|(ts, _)| ts)
}

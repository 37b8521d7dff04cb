//! Per-user partition assigners.
//!
//! Every assigner groups rows by `userId`, writes one label per row into a side
//! table indexed like the input, and only then materializes fresh train/test
//! tables. The caller's table is never modified and labels never leak into the
//! returned rows.

use indexmap::IndexMap;
use rand::Rng;
use rand::seq::SliceRandom;
use std::cmp::Reverse;
use tracing::{debug, warn};

use crate::allocation::allocate_group;
use crate::config::HoldOutSize;
use crate::data::{InteractionTable, Partition, PartitionSet};
use crate::types::{FoldIndex, Timestamp};

/// Side of a partition a row is assigned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SplitLabel {
    /// Training side.
    Train,
    /// Held-out side (test, or validation when nested).
    Test,
}

/// Row indices per user, users in ascending id order, rows in table order.
pub fn user_groups(table: &InteractionTable) -> IndexMap<&str, Vec<usize>> {
    let mut groups: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for (idx, record) in table.iter().enumerate() {
        groups.entry(record.user_id.as_str()).or_default().push(idx);
    }
    groups.sort_keys();
    groups
}

/// Build a partition from a per-row label side table. Both sides keep table order.
pub fn materialize(table: &InteractionTable, labels: &[SplitLabel]) -> Partition {
    debug_assert_eq!(table.len(), labels.len());
    let mut train = Vec::new();
    let mut test = Vec::new();
    for (idx, label) in labels.iter().enumerate() {
        match label {
            SplitLabel::Train => train.push(idx),
            SplitLabel::Test => test.push(idx),
        }
    }
    Partition::new(table.select(&train), table.select(&test))
}

/// Label rows at or after `threshold` as test.
pub fn fixed_timestamp_labels(table: &InteractionTable, threshold: Timestamp) -> Vec<SplitLabel> {
    table
        .iter()
        .map(|record| {
            if record.timestamp >= threshold {
                SplitLabel::Test
            } else {
                SplitLabel::Train
            }
        })
        .collect()
}

/// Label each user's most recent rows as test.
///
/// Ratio: rank rows ascending by timestamp (ties by row order); ranks above
/// `floor(count * (1 - ratio))` are test. Leave-n-out: rank rows descending by
/// timestamp (ties by row order); the first `n` ranks are test.
pub fn temporal_hold_out_labels(table: &InteractionTable, size: HoldOutSize) -> Vec<SplitLabel> {
    let records = table.records();
    let mut labels = vec![SplitLabel::Train; table.len()];
    let mut degenerate = 0usize;

    for (_, mut rows) in user_groups(table) {
        let alloc = allocate_group(rows.len(), size);
        degenerate += usize::from(alloc.is_degenerate(size));
        match size {
            HoldOutSize::Ratio(_) => {
                rows.sort_by_key(|&idx| records[idx].timestamp);
                for &idx in &rows[alloc.train..] {
                    labels[idx] = SplitLabel::Test;
                }
            }
            HoldOutSize::LeaveNOut(_) => {
                rows.sort_by_key(|&idx| Reverse(records[idx].timestamp));
                for &idx in &rows[..alloc.test] {
                    labels[idx] = SplitLabel::Test;
                }
            }
        }
    }

    warn_degenerate(degenerate, size);
    labels
}

/// Randomly label rows per user, holding out the allocation given by `size`.
///
/// Users are visited in ascending id order so a seeded `rng` reproduces the same labels.
pub fn subsampling_labels<R>(
    table: &InteractionTable,
    size: HoldOutSize,
    rng: &mut R,
) -> Vec<SplitLabel>
where
    R: Rng + ?Sized,
{
    let mut labels = vec![SplitLabel::Train; table.len()];
    let mut degenerate = 0usize;

    for (_, rows) in user_groups(table) {
        let alloc = allocate_group(rows.len(), size);
        degenerate += usize::from(alloc.is_degenerate(size));
        let mut group_labels = Vec::with_capacity(rows.len());
        group_labels.extend(std::iter::repeat_n(SplitLabel::Train, alloc.train));
        group_labels.extend(std::iter::repeat_n(SplitLabel::Test, alloc.test));
        group_labels.shuffle(rng);
        for (idx, label) in rows.into_iter().zip(group_labels) {
            labels[idx] = label;
        }
    }

    warn_degenerate(degenerate, size);
    labels
}

/// Assign each user's rows a fold index round-robin in row order.
pub fn cross_validation_folds(table: &InteractionTable, folds: usize) -> Vec<FoldIndex> {
    let mut assignment = vec![0; table.len()];
    if folds == 0 {
        return assignment;
    }
    for (_, rows) in user_groups(table) {
        for (position, idx) in rows.into_iter().enumerate() {
            assignment[idx] = position % folds;
        }
    }
    assignment
}

/// Single partition on an explicit timestamp threshold.
pub fn split_fixed_timestamp(table: &InteractionTable, threshold: Timestamp) -> PartitionSet {
    let labels = fixed_timestamp_labels(table, threshold);
    vec![materialize(table, &labels)]
}

/// Single per-user temporal hold-out partition.
pub fn split_temporal_hold_out(table: &InteractionTable, size: HoldOutSize) -> PartitionSet {
    let labels = temporal_hold_out_labels(table, size);
    vec![materialize(table, &labels)]
}

/// `folds` independently resampled per-user random hold-out partitions.
pub fn split_random_subsampling<R>(
    table: &InteractionTable,
    folds: usize,
    size: HoldOutSize,
    rng: &mut R,
) -> PartitionSet
where
    R: Rng + ?Sized,
{
    (0..folds)
        .map(|_| {
            let labels = subsampling_labels(table, size, rng);
            materialize(table, &labels)
        })
        .collect()
}

/// `folds` complementary partitions; partition `i` holds out fold `i`.
pub fn split_cross_validation(table: &InteractionTable, folds: usize) -> PartitionSet {
    let assignment = cross_validation_folds(table, folds);
    (0..folds)
        .map(|fold| {
            let labels: Vec<SplitLabel> = assignment
                .iter()
                .map(|&assigned| {
                    if assigned == fold {
                        SplitLabel::Test
                    } else {
                        SplitLabel::Train
                    }
                })
                .collect();
            debug!(fold, folds, "materializing cross-validation fold");
            materialize(table, &labels)
        })
        .collect()
}

fn warn_degenerate(users: usize, size: HoldOutSize) {
    if users > 0 {
        warn!(
            users,
            ?size,
            "users have fewer interactions than the requested hold-out; their rows all went to test"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InteractionRecord;
    use crate::rng::SplitRng;

    fn table(rows: &[(&str, &str, i64)]) -> InteractionTable {
        rows.iter()
            .map(|(user, item, ts)| InteractionRecord::new(*user, *item, 1.0, *ts))
            .collect()
    }

    fn items(table: &InteractionTable) -> Vec<&str> {
        table.iter().map(|r| r.item_id.as_str()).collect()
    }

    #[test]
    fn user_groups_are_sorted_by_user_and_keep_row_order() {
        let t = table(&[("b", "1", 1), ("a", "2", 1), ("b", "3", 1), ("a", "4", 1)]);
        let groups = user_groups(&t);
        let keys: Vec<&str> = groups.keys().copied().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(groups["a"], vec![1, 3]);
        assert_eq!(groups["b"], vec![0, 2]);
    }

    #[test]
    fn fixed_timestamp_is_inclusive_on_the_test_side() {
        let t = table(&[("a", "1", 5), ("a", "2", 10), ("b", "3", 9), ("b", "4", 11)]);
        let split = split_fixed_timestamp(&t, 10);
        assert_eq!(split.len(), 1);
        assert_eq!(items(&split[0].train), vec!["1", "3"]);
        assert_eq!(items(&split[0].test), vec!["2", "4"]);
    }

    #[test]
    fn temporal_ratio_uses_first_rank_for_ties() {
        // Rows 2 and 3 share a timestamp; the earlier row ranks first and stays in train.
        let t = table(&[("a", "1", 1), ("a", "2", 7), ("a", "3", 7), ("a", "4", 3)]);
        let split = split_temporal_hold_out(&t, HoldOutSize::Ratio(0.25));
        assert_eq!(items(&split[0].train), vec!["1", "2", "4"]);
        assert_eq!(items(&split[0].test), vec!["3"]);
    }

    #[test]
    fn temporal_leave_n_out_takes_most_recent_rows() {
        let t = table(&[
            ("a", "1", 4),
            ("a", "2", 9),
            ("a", "3", 1),
            ("a", "4", 6),
            ("b", "5", 2),
            ("b", "6", 3),
        ]);
        let split = split_temporal_hold_out(&t, HoldOutSize::LeaveNOut(2));
        assert_eq!(items(&split[0].test), vec!["2", "4", "5", "6"]);
        assert_eq!(items(&split[0].train), vec!["1", "3"]);
    }

    #[test]
    fn temporal_leave_n_out_breaks_ties_by_row_order() {
        let t = table(&[("a", "1", 5), ("a", "2", 5), ("a", "3", 5)]);
        let split = split_temporal_hold_out(&t, HoldOutSize::LeaveNOut(1));
        assert_eq!(items(&split[0].test), vec!["1"]);
    }

    #[test]
    fn subsampling_respects_per_user_allocation_in_every_fold() {
        let rows: Vec<(String, String, i64)> = (0..10)
            .map(|i| ("a".to_string(), format!("a{i}"), i))
            .chain((0..3).map(|i| ("b".to_string(), format!("b{i}"), i)))
            .collect();
        let t: InteractionTable = rows
            .iter()
            .map(|(u, i, ts)| InteractionRecord::new(u.as_str(), i.as_str(), 1.0, *ts))
            .collect();
        let mut rng = SplitRng::new(11);
        let split = split_random_subsampling(&t, 4, HoldOutSize::Ratio(0.3), &mut rng);
        assert_eq!(split.len(), 4);
        for partition in &split {
            let test_a = partition.test.iter().filter(|r| r.user_id == "a").count();
            let test_b = partition.test.iter().filter(|r| r.user_id == "b").count();
            assert_eq!(test_a, 3);
            assert_eq!(test_b, 1);
            assert_eq!(partition.train.len() + partition.test.len(), t.len());
        }
    }

    #[test]
    fn subsampling_is_reproducible_for_a_seed() {
        let t: InteractionTable = (0..30)
            .map(|i| InteractionRecord::new(format!("u{}", i % 3), format!("i{i}"), 1.0, i))
            .collect();
        let first = subsampling_labels(&t, HoldOutSize::LeaveNOut(2), &mut SplitRng::new(3));
        let second = subsampling_labels(&t, HoldOutSize::LeaveNOut(2), &mut SplitRng::new(3));
        assert_eq!(first, second);
        assert_eq!(first.iter().filter(|l| **l == SplitLabel::Test).count(), 6);
    }

    #[test]
    fn cross_validation_cycles_folds_per_user() {
        let t = table(&[("a", "1", 1), ("b", "2", 1), ("a", "3", 1), ("a", "4", 1), ("b", "5", 1)]);
        assert_eq!(cross_validation_folds(&t, 2), vec![0, 0, 1, 0, 1]);
        let split = split_cross_validation(&t, 2);
        assert_eq!(items(&split[0].test), vec!["1", "2", "4"]);
        assert_eq!(items(&split[1].test), vec!["3", "5"]);
        assert_eq!(items(&split[1].train), vec!["1", "2", "4"]);
    }

    #[test]
    fn empty_tables_produce_empty_partitions() {
        let t = InteractionTable::new();
        assert_eq!(split_temporal_hold_out(&t, HoldOutSize::Ratio(0.2)), vec![Partition::default()]);
        assert_eq!(split_cross_validation(&t, 3).len(), 3);
        assert!(split_cross_validation(&t, 3).iter().all(|p| p.train.is_empty() && p.test.is_empty()));
    }
}

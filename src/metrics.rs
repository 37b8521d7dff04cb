use std::collections::HashSet;

use crate::data::{InteractionTable, Partition};

/// Row and user counts of a single partition.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionStats {
    pub train_rows: usize,
    pub test_rows: usize,
    pub train_users: usize,
    pub test_users: usize,
    /// Users present in test but absent from train (cold-start users).
    pub cold_users: usize,
    pub test_share: f64,
}

/// Compute row and user counts for `partition`.
pub fn partition_stats(partition: &Partition) -> PartitionStats {
    let train_users = users(&partition.train);
    let test_users = users(&partition.test);
    let train_rows = partition.train.len();
    let test_rows = partition.test.len();
    let total = train_rows + test_rows;
    PartitionStats {
        train_rows,
        test_rows,
        train_users: train_users.len(),
        test_users: test_users.len(),
        cold_users: test_users.difference(&train_users).count(),
        test_share: if total == 0 {
            0.0
        } else {
            test_rows as f64 / total as f64
        },
    }
}

/// Aggregate view over all partitions of one split.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitSummary {
    pub partitions: usize,
    pub min_test_rows: usize,
    pub max_test_rows: usize,
    pub mean_test_share: f64,
    pub per_partition: Vec<PartitionStats>,
}

/// Summarize a partition set. Returns `None` when there are no partitions.
pub fn split_summary(partitions: &[Partition]) -> Option<SplitSummary> {
    if partitions.is_empty() {
        return None;
    }
    let per_partition: Vec<PartitionStats> = partitions.iter().map(partition_stats).collect();
    let min_test_rows = per_partition.iter().map(|s| s.test_rows).min().unwrap_or(0);
    let max_test_rows = per_partition.iter().map(|s| s.test_rows).max().unwrap_or(0);
    let mean_test_share =
        per_partition.iter().map(|s| s.test_share).sum::<f64>() / per_partition.len() as f64;
    Some(SplitSummary {
        partitions: per_partition.len(),
        min_test_rows,
        max_test_rows,
        mean_test_share,
        per_partition,
    })
}

fn users(table: &InteractionTable) -> HashSet<&str> {
    table.iter().map(|record| record.user_id.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InteractionRecord;

    fn table(rows: &[(&str, i64)]) -> InteractionTable {
        rows.iter()
            .map(|(user, ts)| InteractionRecord::new(*user, "item", 1.0, *ts))
            .collect()
    }

    #[test]
    fn partition_stats_report_cold_users() {
        let partition = Partition::new(
            table(&[("a", 1), ("a", 2), ("b", 1)]),
            table(&[("a", 3), ("c", 3)]),
        );
        let stats = partition_stats(&partition);
        assert_eq!(stats.train_rows, 3);
        assert_eq!(stats.test_rows, 2);
        assert_eq!(stats.train_users, 2);
        assert_eq!(stats.test_users, 2);
        assert_eq!(stats.cold_users, 1);
        assert!((stats.test_share - 0.4).abs() < 1e-9);
    }

    #[test]
    fn split_summary_aggregates_partitions() {
        assert!(split_summary(&[]).is_none());
        let partitions = vec![
            Partition::new(table(&[("a", 1), ("a", 2), ("a", 3)]), table(&[("a", 4)])),
            Partition::new(table(&[("a", 1), ("a", 2)]), table(&[("a", 3), ("a", 4)])),
        ];
        let summary = split_summary(&partitions).expect("summary");
        assert_eq!(summary.partitions, 2);
        assert_eq!(summary.min_test_rows, 1);
        assert_eq!(summary.max_test_rows, 2);
        assert!((summary.mean_test_share - 0.375).abs() < 1e-9);
        assert_eq!(summary.per_partition.len(), 2);
    }

    #[test]
    fn empty_partition_has_zero_share() {
        let stats = partition_stats(&Partition::default());
        assert_eq!(stats.test_share, 0.0);
        assert_eq!(stats.cold_users, 0);
    }
}

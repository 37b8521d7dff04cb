/// Fixed column names of the interaction table contract.
pub mod columns {
    /// Column holding the user identifier.
    pub const USER_ID: &str = "userId";
    /// Column holding the item identifier.
    pub const ITEM_ID: &str = "itemId";
    /// Column holding the rating (or implicit-feedback marker).
    pub const RATING: &str = "rating";
    /// Column holding the interaction timestamp.
    pub const TIMESTAMP: &str = "timestamp";
    /// Canonical column order used by tabular loaders.
    pub const ALL_COLUMNS: [&str; 4] = [USER_ID, ITEM_ID, RATING, TIMESTAMP];
}

/// Keys recognized in a splitting configuration tree.
pub mod config_keys {
    /// Branch holding externally supplied train/validation/test paths.
    pub const PRE_SPLIT: &str = "pre_split";
    /// Branch holding the outer (test) splitting strategy.
    pub const TEST_SPLITTING: &str = "test_splitting";
    /// Branch holding the inner (validation) splitting strategy.
    pub const VALIDATION_SPLITTING: &str = "validation_splitting";

    /// Pre-split path to the training table.
    pub const TRAIN_PATH: &str = "train_path";
    /// Pre-split path to the optional validation table.
    pub const VALIDATION_PATH: &str = "validation_path";
    /// Pre-split path to the test table.
    pub const TEST_PATH: &str = "test_path";

    /// Strategy selector inside a splitting branch.
    pub const STRATEGY: &str = "strategy";
    /// Explicit threshold or the `best` sentinel for `fixed_timestamp`.
    pub const TIMESTAMP: &str = "timestamp";
    /// Share of each user's rows assigned to test.
    pub const TEST_RATIO: &str = "test_ratio";
    /// Number of rows per user assigned to test.
    pub const LEAVE_N_OUT: &str = "leave_n_out";
    /// Number of folds (cross-validation) or repetitions (subsampling).
    pub const FOLDS: &str = "folds";
    /// Minimum rows a user needs strictly before a candidate timestamp.
    pub const MIN_BELOW: &str = "min_below";
    /// Minimum rows a user needs at or after a candidate timestamp.
    pub const MIN_OVER: &str = "min_over";
}

/// Strategy names accepted by the `strategy` key.
pub mod strategies {
    /// Split on a single timestamp threshold.
    pub const FIXED_TIMESTAMP: &str = "fixed_timestamp";
    /// Per-user temporal hold-out by ratio or leave-n-out.
    pub const TEMPORAL_HOLD_OUT: &str = "temporal_hold_out";
    /// Per-user repeated random hold-out.
    pub const RANDOM_SUBSAMPLING: &str = "random_subsampling";
    /// Per-user round-robin k-fold cross-validation.
    pub const RANDOM_CROSS_VALIDATION: &str = "random_cross_validation";
    /// Literal accepted by `timestamp` to request the best-timestamp search.
    pub const BEST_TIMESTAMP: &str = "best";
}

/// Default option values.
pub mod defaults {
    /// Default `min_below` for the best-timestamp search.
    pub const MIN_BELOW: usize = 1;
    /// Default `min_over` for the best-timestamp search.
    pub const MIN_OVER: usize = 1;
    /// Rating assumed when a loaded table has no rating column.
    pub const IMPLICIT_RATING: f64 = 1.0;
    /// Timestamp assumed when a loaded table has no timestamp column.
    pub const MISSING_TIMESTAMP: i64 = 0;
    /// Field separator used by the TSV loader.
    pub const TSV_SEPARATOR: char = '\t';
}

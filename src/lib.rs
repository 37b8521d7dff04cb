#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Per-user train/test row allocation formulas.
pub mod allocation;
/// Splitting configuration types and validation of configuration trees.
pub mod config;
/// Column names, option keys, strategy names, and defaults.
pub mod constants;
/// Interaction records, tables, and partition types.
pub mod data;
/// Partition statistics used for split summaries.
pub mod metrics;
/// Seedable RNG for reproducible random strategies.
pub mod rng;
/// Best-timestamp search for `fixed_timestamp: best`.
pub mod search;
/// Strategy dispatch and nested splitting orchestration.
pub mod splitter;
/// Per-user partition assigners.
pub mod splits;
/// Table loaders for externally prepared splits.
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::{HoldOutSize, PreSplitPaths, SplittingConfig, Strategy, TimestampSpec};
pub use data::{
    Column, FieldValue, InteractionRecord, InteractionTable, NestedPartition, Partition,
    PartitionSet, PreSplitTables, SplitOutcome,
};
pub use errors::SplitError;
pub use rng::SplitRng;
pub use search::search_best_timestamp;
pub use splits::SplitLabel;
pub use splitter::Splitter;
pub use transport::TableLoader;
pub use transport::fs::TsvTableLoader;
pub use types::{FoldIndex, ItemId, Rating, Timestamp, UserId};

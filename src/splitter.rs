//! Strategy dispatch and nested train/validation/test orchestration.
//!
//! Result shapes:
//!
//! - hold-out: `[(train, test)]`
//! - k partitions: `[(train_0, test_0), ..., (train_k, test_k)]`
//! - nested: `[([(train_0, val_0), ...], test_0), ..., ([...], test_k)]`, where the
//!   inner pairs of entry `i` are computed on `train_i` alone.

use rand::Rng;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{SplittingConfig, Strategy, TimestampSpec};
use crate::data::{
    InteractionTable, NestedPartition, Partition, PartitionSet, PreSplitTables, SplitOutcome,
};
use crate::errors::SplitError;
use crate::metrics::split_summary;
use crate::search::search_best_timestamp;
use crate::splits::{
    split_cross_validation, split_fixed_timestamp, split_random_subsampling,
    split_temporal_hold_out,
};
use crate::transport::TableLoader;
use crate::transport::fs::TsvTableLoader;

/// Partitions interaction tables according to a [`SplittingConfig`].
///
/// The splitter holds no state besides its configuration and table loader, so one
/// instance can serve any number of runs.
#[derive(Clone)]
pub struct Splitter {
    config: SplittingConfig,
    loader: Arc<dyn TableLoader>,
}

impl fmt::Debug for Splitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Splitter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Splitter {
    /// Create a splitter that reads `pre_split` tables with [`TsvTableLoader`].
    pub fn new(config: SplittingConfig) -> Self {
        Self {
            config,
            loader: Arc::new(TsvTableLoader::default()),
        }
    }

    /// Replace the loader used for `pre_split` tables.
    pub fn with_loader(mut self, loader: Arc<dyn TableLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Configuration this splitter was built with.
    pub fn config(&self) -> &SplittingConfig {
        &self.config
    }

    /// Run the configured splitting.
    ///
    /// Order of precedence: `pre_split` tables are loaded and returned untouched;
    /// otherwise `test_splitting` produces the outer partitions and, when present,
    /// `validation_splitting` is applied to every outer train side.
    pub fn process_splitting<R>(
        &self,
        data: &InteractionTable,
        rng: &mut R,
    ) -> Result<SplitOutcome, SplitError>
    where
        R: Rng + ?Sized,
    {
        self.config.validate()?;

        if let Some(paths) = &self.config.pre_split {
            let train = self.loader.load(&paths.train_path)?;
            let validation = paths
                .validation_path
                .as_deref()
                .map(|path| self.loader.load(path))
                .transpose()?;
            let test = self.loader.load(&paths.test_path)?;
            info!(
                train = train.len(),
                validation = validation.as_ref().map(InteractionTable::len),
                test = test.len(),
                "loaded pre-split tables"
            );
            return Ok(SplitOutcome::PreSplit(PreSplitTables {
                train,
                validation,
                test,
            }));
        }

        let Some(test_strategy) = &self.config.test_splitting else {
            return Err(SplitError::config("test splitting strategy is not defined"));
        };

        let outer = Self::apply_strategy(data, test_strategy, rng);
        log_summary("test", test_strategy, &outer);

        match &self.config.validation_splitting {
            Some(validation_strategy) => {
                let inner: Vec<PartitionSet> = outer
                    .iter()
                    .map(|partition| {
                        let inner =
                            Self::apply_strategy(&partition.train, validation_strategy, rng);
                        log_summary("validation", validation_strategy, &inner);
                        inner
                    })
                    .collect();
                Ok(SplitOutcome::Nested(Self::rearrange(outer, inner)))
            }
            None => Ok(SplitOutcome::Flat(outer)),
        }
    }

    /// Validate an untyped strategy node and split `data` with it.
    pub fn handle_hierarchy<R>(
        data: &InteractionTable,
        node: &Value,
        rng: &mut R,
    ) -> Result<PartitionSet, SplitError>
    where
        R: Rng + ?Sized,
    {
        let strategy = Strategy::from_node(node)?;
        Ok(Self::apply_strategy(data, &strategy, rng))
    }

    /// Split `data` with an already validated strategy.
    pub fn apply_strategy<R>(
        data: &InteractionTable,
        strategy: &Strategy,
        rng: &mut R,
    ) -> PartitionSet
    where
        R: Rng + ?Sized,
    {
        debug!(
            strategy = strategy.name(),
            rows = data.len(),
            "applying splitting strategy"
        );
        match *strategy {
            Strategy::FixedTimestamp {
                timestamp: TimestampSpec::Fixed(threshold),
            } => split_fixed_timestamp(data, threshold),
            Strategy::FixedTimestamp {
                timestamp: TimestampSpec::Best { min_below, min_over },
            } => match search_best_timestamp(data, min_below, min_over) {
                Some(threshold) => {
                    info!(threshold, min_below, min_over, "best timestamp");
                    split_fixed_timestamp(data, threshold)
                }
                None => vec![Partition::default()],
            },
            Strategy::TemporalHoldOut { size } => split_temporal_hold_out(data, size),
            Strategy::RandomSubsampling { folds, size } => {
                split_random_subsampling(data, folds, size, rng)
            }
            Strategy::RandomCrossValidation { folds } => split_cross_validation(data, folds),
        }
    }

    /// Pair inner partition set `i` with the test side of outer partition `i`.
    pub fn rearrange(outer: PartitionSet, inner: Vec<PartitionSet>) -> Vec<NestedPartition> {
        outer
            .into_iter()
            .zip(inner)
            .map(|(partition, validation)| NestedPartition {
                validation,
                test: partition.test,
            })
            .collect()
    }
}

fn log_summary(stage: &str, strategy: &Strategy, partitions: &[Partition]) {
    let Some(summary) = split_summary(partitions) else {
        return;
    };
    let size = match strategy {
        Strategy::TemporalHoldOut { size } | Strategy::RandomSubsampling { size, .. } => {
            Some(*size)
        }
        _ => None,
    };
    info!(
        stage,
        strategy = strategy.name(),
        ?size,
        partitions = summary.partitions,
        min_test_rows = summary.min_test_rows,
        max_test_rows = summary.max_test_rows,
        mean_test_share = summary.mean_test_share,
        "split complete"
    );
    for (idx, stats) in summary.per_partition.iter().enumerate() {
        debug!(
            stage,
            partition = idx,
            train = stats.train_rows,
            test = stats.test_rows,
            cold_users = stats.cold_users,
            "partition"
        );
    }
}

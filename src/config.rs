use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::constants::config_keys::{
    FOLDS, LEAVE_N_OUT, MIN_BELOW, MIN_OVER, PRE_SPLIT, STRATEGY, TEST_PATH, TEST_RATIO,
    TEST_SPLITTING, TIMESTAMP, TRAIN_PATH, VALIDATION_PATH, VALIDATION_SPLITTING,
};
use crate::constants::defaults;
use crate::constants::strategies::{
    BEST_TIMESTAMP, FIXED_TIMESTAMP, RANDOM_CROSS_VALIDATION, RANDOM_SUBSAMPLING,
    TEMPORAL_HOLD_OUT,
};
use crate::errors::SplitError;
use crate::types::Timestamp;

/// Top-level splitting configuration.
///
/// Typically parsed from a YAML/JSON tree such as:
///
/// ```yaml
/// test_splitting:
///   strategy: random_subsampling
///   folds: 5
///   test_ratio: 0.2
/// validation_splitting:
///   strategy: fixed_timestamp
///   timestamp: best
/// ```
///
/// `pre_split` takes precedence over `test_splitting` when both are present.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct SplittingConfig {
    /// Externally prepared tables; disables partitioning entirely.
    pub pre_split: Option<PreSplitPaths>,
    /// Strategy producing the outer (train, test) partitions.
    pub test_splitting: Option<Strategy>,
    /// Strategy applied to every outer train side to produce (train, validation) partitions.
    pub validation_splitting: Option<Strategy>,
}

/// Paths of externally prepared tables.
#[derive(Clone, Debug, PartialEq)]
pub struct PreSplitPaths {
    /// Training table path.
    pub train_path: PathBuf,
    /// Optional validation table path.
    pub validation_path: Option<PathBuf>,
    /// Test table path.
    pub test_path: PathBuf,
}

/// A validated splitting strategy with its options.
#[derive(Clone, Debug, PartialEq)]
pub enum Strategy {
    /// Rows at or after a timestamp are test.
    FixedTimestamp {
        /// Explicit threshold or best-timestamp search parameters.
        timestamp: TimestampSpec,
    },
    /// Per-user temporal hold-out of the most recent rows.
    TemporalHoldOut {
        /// How many rows per user are held out.
        size: HoldOutSize,
    },
    /// Per-user random hold-out, repeated `folds` times.
    RandomSubsampling {
        /// Number of independently resampled partitions.
        folds: usize,
        /// How many rows per user are held out in each partition.
        size: HoldOutSize,
    },
    /// Per-user round-robin k-fold cross-validation.
    RandomCrossValidation {
        /// Number of folds.
        folds: usize,
    },
}

/// Threshold selection for [`Strategy::FixedTimestamp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampSpec {
    /// Use this threshold as is.
    Fixed(Timestamp),
    /// Search the threshold that keeps the most users on both sides.
    Best {
        /// Rows a user needs strictly before the threshold.
        min_below: usize,
        /// Rows a user needs at or after the threshold.
        min_over: usize,
    },
}

impl TimestampSpec {
    /// Best-timestamp search with default thresholds.
    pub fn best() -> Self {
        Self::Best {
            min_below: defaults::MIN_BELOW,
            min_over: defaults::MIN_OVER,
        }
    }
}

/// Per-user test allocation for hold-out style strategies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HoldOutSize {
    /// Share of each user's rows held out, in `[0, 1]`.
    Ratio(f64),
    /// Exact number of rows held out per user.
    LeaveNOut(usize),
}

impl SplittingConfig {
    /// Parse and validate a configuration tree.
    pub fn from_value(value: &Value) -> Result<Self, SplitError> {
        let root = as_mapping(value, "splitting")?;

        let pre_split = match present(root, PRE_SPLIT) {
            Some(node) => Some(PreSplitPaths::from_node(node)?),
            None => None,
        };
        let test_splitting = present(root, TEST_SPLITTING)
            .map(Strategy::from_node)
            .transpose()?;
        let validation_splitting = present(root, VALIDATION_SPLITTING)
            .map(Strategy::from_node)
            .transpose()?;

        Ok(Self {
            pre_split,
            test_splitting,
            validation_splitting,
        })
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, SplitError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| SplitError::config(format!("invalid splitting document: {err}")))?;
        Self::from_value(&value)
    }

    /// Re-check option ranges of a configuration built directly in Rust.
    pub fn validate(&self) -> Result<(), SplitError> {
        if let Some(strategy) = &self.test_splitting {
            strategy.validate()?;
        }
        if let Some(strategy) = &self.validation_splitting {
            strategy.validate()?;
        }
        Ok(())
    }
}

impl TryFrom<Value> for SplittingConfig {
    type Error = SplitError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl PreSplitPaths {
    fn from_node(node: &Value) -> Result<Self, SplitError> {
        let map = as_mapping(node, PRE_SPLIT)?;
        let train_path = path_option(map, TRAIN_PATH)?;
        let test_path = path_option(map, TEST_PATH)?;
        let validation_path = path_option(map, VALIDATION_PATH)?;
        match (train_path, test_path) {
            (Some(train_path), Some(test_path)) => Ok(Self {
                train_path,
                validation_path,
                test_path,
            }),
            _ => Err(SplitError::config("train or test paths are missing")),
        }
    }
}

impl Strategy {
    /// Validate a single strategy node (`test_splitting` or `validation_splitting`).
    ///
    /// `temporal_hold_out` reads `test_ratio` before `leave_n_out`; `random_subsampling`
    /// requires `folds` and then reads `test_ratio` before `leave_n_out`.
    pub fn from_node(node: &Value) -> Result<Self, SplitError> {
        let map = as_mapping(node, STRATEGY)?;
        let name = match present(map, STRATEGY) {
            Some(Value::String(name)) => name.as_str(),
            Some(other) => {
                return Err(SplitError::config(format!(
                    "strategy option is not a string: {other}"
                )));
            }
            None => return Err(SplitError::config("strategy option not found")),
        };

        let strategy = match name {
            FIXED_TIMESTAMP => {
                let timestamp = match present(map, TIMESTAMP) {
                    Some(raw) => parse_timestamp(raw, map)?,
                    None => return Err(missing_option(TIMESTAMP, name)),
                };
                Strategy::FixedTimestamp { timestamp }
            }
            TEMPORAL_HOLD_OUT => Strategy::TemporalHoldOut {
                size: hold_out_size(map, name)?,
            },
            RANDOM_SUBSAMPLING => {
                let folds = folds_option(map, name)?;
                Strategy::RandomSubsampling {
                    folds,
                    size: hold_out_size(map, name)?,
                }
            }
            RANDOM_CROSS_VALIDATION => Strategy::RandomCrossValidation {
                folds: folds_option(map, name)?,
            },
            other => {
                return Err(SplitError::config(format!(
                    "unrecognized splitting strategy '{other}'"
                )));
            }
        };
        strategy.validate()?;
        Ok(strategy)
    }

    /// Configuration name of the strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FixedTimestamp { .. } => FIXED_TIMESTAMP,
            Self::TemporalHoldOut { .. } => TEMPORAL_HOLD_OUT,
            Self::RandomSubsampling { .. } => RANDOM_SUBSAMPLING,
            Self::RandomCrossValidation { .. } => RANDOM_CROSS_VALIDATION,
        }
    }

    /// Number of partitions this strategy produces.
    pub fn partition_count(&self) -> usize {
        match self {
            Self::FixedTimestamp { .. } | Self::TemporalHoldOut { .. } => 1,
            Self::RandomSubsampling { folds, .. } | Self::RandomCrossValidation { folds } => *folds,
        }
    }

    /// Check option ranges (`folds >= 1`, `test_ratio` in `[0, 1]`).
    pub fn validate(&self) -> Result<(), SplitError> {
        match self {
            Self::FixedTimestamp { .. } => Ok(()),
            Self::TemporalHoldOut { size } => validate_size(*size, self.name()),
            Self::RandomSubsampling { folds, size } => {
                validate_folds(*folds, self.name())?;
                validate_size(*size, self.name())
            }
            Self::RandomCrossValidation { folds } => validate_folds(*folds, self.name()),
        }
    }
}

fn validate_folds(folds: usize, strategy: &str) -> Result<(), SplitError> {
    if folds == 0 {
        return Err(SplitError::config(format!(
            "folds option of {strategy} strategy must be at least 1"
        )));
    }
    Ok(())
}

fn validate_size(size: HoldOutSize, strategy: &str) -> Result<(), SplitError> {
    if let HoldOutSize::Ratio(ratio) = size
        && !(0.0..=1.0).contains(&ratio)
    {
        return Err(SplitError::config(format!(
            "test_ratio option of {strategy} strategy must be within [0, 1], found {ratio}"
        )));
    }
    Ok(())
}

fn as_mapping<'a>(value: &'a Value, context: &str) -> Result<&'a Map<String, Value>, SplitError> {
    value
        .as_object()
        .ok_or_else(|| SplitError::config(format!("{context} section must be a mapping")))
}

/// Lookup that treats explicit `null` like an absent key.
fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn missing_option(key: &str, strategy: &str) -> SplitError {
    SplitError::config(format!("option {key} missing for {strategy} strategy"))
}

fn invalid_option(key: &str, raw: &Value) -> SplitError {
    SplitError::config(format!("{key} option value is not valid: {raw}"))
}

fn hold_out_size(map: &Map<String, Value>, strategy: &str) -> Result<HoldOutSize, SplitError> {
    if let Some(raw) = present(map, TEST_RATIO) {
        return parse_ratio(raw).map(HoldOutSize::Ratio);
    }
    if let Some(raw) = present(map, LEAVE_N_OUT) {
        return parse_count(raw, LEAVE_N_OUT).map(HoldOutSize::LeaveNOut);
    }
    Err(SplitError::config(format!(
        "option {TEST_RATIO} or {LEAVE_N_OUT} missing for {strategy} strategy"
    )))
}

fn folds_option(map: &Map<String, Value>, strategy: &str) -> Result<usize, SplitError> {
    match present(map, FOLDS) {
        Some(raw) => parse_count(raw, FOLDS),
        None => Err(missing_option(FOLDS, strategy)),
    }
}

fn parse_count(raw: &Value, key: &str) -> Result<usize, SplitError> {
    let parsed = match raw {
        Value::Number(number) => number.as_u64(),
        Value::String(text) if is_digits(text) => text.parse::<u64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|value| usize::try_from(value).ok())
        .ok_or_else(|| invalid_option(key, raw))
}

fn parse_ratio(raw: &Value) -> Result<f64, SplitError> {
    let parsed = match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|ratio| ratio.is_finite())
        .ok_or_else(|| invalid_option(TEST_RATIO, raw))
}

fn parse_timestamp(raw: &Value, map: &Map<String, Value>) -> Result<TimestampSpec, SplitError> {
    match raw {
        Value::Number(number) => number
            .as_i64()
            .map(TimestampSpec::Fixed)
            .ok_or_else(|| invalid_option(TIMESTAMP, raw)),
        Value::String(text) if text == BEST_TIMESTAMP => {
            let min_below = match present(map, MIN_BELOW) {
                Some(raw) => parse_count(raw, MIN_BELOW)?,
                None => defaults::MIN_BELOW,
            };
            let min_over = match present(map, MIN_OVER) {
                Some(raw) => parse_count(raw, MIN_OVER)?,
                None => defaults::MIN_OVER,
            };
            Ok(TimestampSpec::Best {
                min_below,
                min_over,
            })
        }
        Value::String(text) if is_digits(text) => text
            .parse::<Timestamp>()
            .map(TimestampSpec::Fixed)
            .map_err(|_| invalid_option(TIMESTAMP, raw)),
        _ => Err(invalid_option(TIMESTAMP, raw)),
    }
}

fn path_option(map: &Map<String, Value>, key: &str) -> Result<Option<PathBuf>, SplitError> {
    match present(map, key) {
        None => Ok(None),
        Some(Value::String(path)) if path.is_empty() => Ok(None),
        Some(Value::String(path)) => Ok(Some(PathBuf::from(path))),
        Some(other) => Err(invalid_option(key, other)),
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strategy(node: Value) -> Result<Strategy, SplitError> {
        Strategy::from_node(&node)
    }

    fn config_message(err: SplitError) -> String {
        match err {
            SplitError::Configuration(msg) => msg,
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn fixed_timestamp_accepts_numbers_digit_strings_and_best() {
        assert_eq!(
            strategy(json!({"strategy": "fixed_timestamp", "timestamp": 1609786061})).unwrap(),
            Strategy::FixedTimestamp {
                timestamp: TimestampSpec::Fixed(1609786061)
            }
        );
        assert_eq!(
            strategy(json!({"strategy": "fixed_timestamp", "timestamp": "42"})).unwrap(),
            Strategy::FixedTimestamp {
                timestamp: TimestampSpec::Fixed(42)
            }
        );
        assert_eq!(
            strategy(json!({"strategy": "fixed_timestamp", "timestamp": "best"})).unwrap(),
            Strategy::FixedTimestamp {
                timestamp: TimestampSpec::best()
            }
        );
        assert_eq!(
            strategy(json!({
                "strategy": "fixed_timestamp",
                "timestamp": "best",
                "min_below": 2,
                "min_over": "3"
            }))
            .unwrap(),
            Strategy::FixedTimestamp {
                timestamp: TimestampSpec::Best {
                    min_below: 2,
                    min_over: 3
                }
            }
        );
    }

    #[test]
    fn fixed_timestamp_rejects_missing_or_bad_timestamp() {
        let msg = config_message(strategy(json!({"strategy": "fixed_timestamp"})).unwrap_err());
        assert!(msg.contains("timestamp missing"));
        let msg = config_message(
            strategy(json!({"strategy": "fixed_timestamp", "timestamp": "yesterday"})).unwrap_err(),
        );
        assert!(msg.contains("timestamp option value is not valid"));
        assert!(strategy(json!({"strategy": "fixed_timestamp", "timestamp": "-5"})).is_err());
    }

    #[test]
    fn temporal_hold_out_prefers_ratio_over_leave_n_out() {
        assert_eq!(
            strategy(json!({"strategy": "temporal_hold_out", "test_ratio": 0.1, "leave_n_out": 3}))
                .unwrap(),
            Strategy::TemporalHoldOut {
                size: HoldOutSize::Ratio(0.1)
            }
        );
        assert_eq!(
            strategy(json!({"strategy": "temporal_hold_out", "leave_n_out": 3})).unwrap(),
            Strategy::TemporalHoldOut {
                size: HoldOutSize::LeaveNOut(3)
            }
        );
        assert!(strategy(json!({"strategy": "temporal_hold_out"})).is_err());
        assert!(strategy(json!({"strategy": "temporal_hold_out", "test_ratio": 1.5})).is_err());
    }

    #[test]
    fn random_subsampling_requires_numeric_folds_first() {
        let msg = config_message(
            strategy(json!({"strategy": "random_subsampling", "test_ratio": 0.2})).unwrap_err(),
        );
        assert!(msg.contains("folds"));
        let msg = config_message(
            strategy(json!({"strategy": "random_subsampling", "folds": "five", "test_ratio": 0.2}))
                .unwrap_err(),
        );
        assert!(msg.contains("folds option value is not valid"));
        assert!(strategy(json!({"strategy": "random_subsampling", "folds": 3})).is_err());
        assert_eq!(
            strategy(json!({"strategy": "random_subsampling", "folds": "3", "leave_n_out": 1}))
                .unwrap(),
            Strategy::RandomSubsampling {
                folds: 3,
                size: HoldOutSize::LeaveNOut(1)
            }
        );
    }

    #[test]
    fn cross_validation_rejects_zero_and_fractional_folds() {
        assert!(strategy(json!({"strategy": "random_cross_validation", "folds": 0})).is_err());
        assert!(strategy(json!({"strategy": "random_cross_validation", "folds": 2.5})).is_err());
        assert_eq!(
            strategy(json!({"strategy": "random_cross_validation", "folds": 5}))
                .unwrap()
                .partition_count(),
            5
        );
    }

    #[test]
    fn unknown_or_missing_strategy_is_rejected() {
        let msg = config_message(strategy(json!({"strategy": "unknown_strategy"})).unwrap_err());
        assert!(msg.contains("unrecognized splitting strategy 'unknown_strategy'"));
        let msg = config_message(strategy(json!({"folds": 5})).unwrap_err());
        assert!(msg.contains("strategy option not found"));
        assert!(strategy(json!("temporal_hold_out")).is_err());
    }

    #[test]
    fn pre_split_requires_train_and_test_paths() {
        let err = SplittingConfig::from_value(&json!({
            "pre_split": {"train_path": "train.tsv", "validation_path": "val.tsv"}
        }))
        .unwrap_err();
        assert!(config_message(err).contains("train or test paths are missing"));

        let config = SplittingConfig::from_value(&json!({
            "pre_split": {"train_path": "train.tsv", "validation_path": "", "test_path": "test.tsv"}
        }))
        .unwrap();
        let paths = config.pre_split.unwrap();
        assert_eq!(paths.train_path, PathBuf::from("train.tsv"));
        assert_eq!(paths.validation_path, None);
    }

    #[test]
    fn null_sections_count_as_absent() {
        let config = SplittingConfig::from_value(&json!({
            "test_splitting": {"strategy": "temporal_hold_out", "leave_n_out": 1, "test_ratio": null},
            "validation_splitting": null
        }))
        .unwrap();
        assert_eq!(
            config.test_splitting,
            Some(Strategy::TemporalHoldOut {
                size: HoldOutSize::LeaveNOut(1)
            })
        );
        assert!(config.validation_splitting.is_none());
    }

    #[test]
    fn deserialize_runs_the_same_validation() {
        let config: SplittingConfig = serde_json::from_str(
            r#"{"test_splitting": {"strategy": "random_cross_validation", "folds": 4}}"#,
        )
        .unwrap();
        assert_eq!(
            config.test_splitting,
            Some(Strategy::RandomCrossValidation { folds: 4 })
        );

        let err = serde_json::from_str::<SplittingConfig>(
            r#"{"test_splitting": {"strategy": "leave_one_out"}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unrecognized splitting strategy"));
    }

    #[test]
    fn validate_catches_rust_built_configs() {
        let config = SplittingConfig {
            test_splitting: Some(Strategy::RandomCrossValidation { folds: 0 }),
            ..SplittingConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(SplittingConfig::default().validate().is_ok());
    }
}

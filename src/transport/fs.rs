use chrono::DateTime;
use std::fs;
use std::path::Path;

use crate::constants::defaults::{IMPLICIT_RATING, MISSING_TIMESTAMP, TSV_SEPARATOR};
use crate::data::{InteractionRecord, InteractionTable};
use crate::errors::SplitError;
use crate::transport::TableLoader;
use crate::types::{Rating, Timestamp};

/// Reads headerless delimited files with columns `userId itemId [rating [timestamp]]`.
///
/// A missing rating column means implicit feedback (`1.0`); a missing timestamp
/// column yields `0`. Timestamps are integer epochs or RFC 3339 datetimes.
#[derive(Clone, Debug)]
pub struct TsvTableLoader {
    separator: char,
}

impl Default for TsvTableLoader {
    fn default() -> Self {
        Self {
            separator: TSV_SEPARATOR,
        }
    }
}

impl TsvTableLoader {
    /// Loader using tab separators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the field separator.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Parse table content that was read from `path` (used for error locations).
    pub fn parse_str(&self, path: &Path, content: &str) -> Result<InteractionTable, SplitError> {
        let mut table = InteractionTable::new();
        for (line_idx, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let record = self.parse_line(line).map_err(|details| SplitError::TableFormat {
                path: path.to_path_buf(),
                line: line_idx + 1,
                details,
            })?;
            table.push(record);
        }
        Ok(table)
    }

    fn parse_line(&self, line: &str) -> Result<InteractionRecord, String> {
        let fields: Vec<&str> = line.split(self.separator).map(str::trim).collect();
        if fields.len() < 2 || fields.len() > 4 {
            return Err(format!("expected 2 to 4 fields, found {}", fields.len()));
        }
        if fields[0].is_empty() || fields[1].is_empty() {
            return Err("user and item identifiers must not be empty".to_string());
        }
        let rating = match fields.get(2) {
            Some(raw) => parse_rating(raw)?,
            None => IMPLICIT_RATING,
        };
        let timestamp = match fields.get(3) {
            Some(raw) => parse_timestamp(raw)?,
            None => MISSING_TIMESTAMP,
        };
        Ok(InteractionRecord::new(fields[0], fields[1], rating, timestamp))
    }
}

impl TableLoader for TsvTableLoader {
    fn load(&self, path: &Path) -> Result<InteractionTable, SplitError> {
        let content = fs::read_to_string(path)?;
        self.parse_str(path, &content)
    }
}

fn parse_rating(raw: &str) -> Result<Rating, String> {
    raw.parse::<Rating>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("invalid rating '{raw}'"))
}

fn parse_timestamp(raw: &str) -> Result<Timestamp, String> {
    if let Ok(value) = raw.parse::<Timestamp>() {
        return Ok(value);
    }
    // Fractional epochs (e.g. `1609786061.0`) truncate to whole seconds.
    if let Ok(value) = raw.parse::<f64>()
        && value.is_finite()
    {
        return Ok(value.trunc() as Timestamp);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|datetime| datetime.timestamp())
        .map_err(|err| format!("invalid timestamp '{raw}': {err}"))
}

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for splitting configuration and pre-split table loading failures.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("malformed table '{}' at line {line}: {details}", path.display())]
    TableFormat {
        path: PathBuf,
        line: usize,
        details: String,
    },
}

impl SplitError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

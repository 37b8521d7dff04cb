use std::path::Path;

use crate::data::InteractionTable;
use crate::errors::SplitError;

/// Filesystem-backed table readers.
pub mod fs;

/// Loads externally prepared interaction tables (the `pre_split` paths).
///
/// Implementations must return the table exactly as stored; the splitter passes it
/// through without further processing.
pub trait TableLoader: Send + Sync {
    /// Read the table stored at `path`.
    fn load(&self, path: &Path) -> Result<InteractionTable, SplitError>;
}

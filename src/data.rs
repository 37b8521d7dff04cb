use serde::{Deserialize, Serialize};

use crate::constants::columns::{ITEM_ID, RATING, TIMESTAMP, USER_ID};

pub use crate::types::{ItemId, Rating, Timestamp, UserId};

/// A single user-item interaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// User that produced the interaction.
    #[serde(rename = "userId")]
    pub user_id: UserId,
    /// Item the user interacted with.
    #[serde(rename = "itemId")]
    pub item_id: ItemId,
    /// Explicit rating, or `1.0` for implicit feedback.
    pub rating: Rating,
    /// When the interaction happened.
    pub timestamp: Timestamp,
}

impl InteractionRecord {
    /// Build a record from its four fields.
    pub fn new(
        user_id: impl Into<UserId>,
        item_id: impl Into<ItemId>,
        rating: Rating,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            rating,
            timestamp,
        }
    }

    /// Value of `column` for this record.
    pub fn value(&self, column: Column) -> FieldValue<'_> {
        match column {
            Column::UserId => FieldValue::Id(&self.user_id),
            Column::ItemId => FieldValue::Id(&self.item_id),
            Column::Rating => FieldValue::Rating(self.rating),
            Column::Timestamp => FieldValue::Timestamp(self.timestamp),
        }
    }
}

/// Named columns of an [`InteractionTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    /// `userId`
    UserId,
    /// `itemId`
    ItemId,
    /// `rating`
    Rating,
    /// `timestamp`
    Timestamp,
}

impl Column {
    /// Resolve a contract column name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            USER_ID => Some(Self::UserId),
            ITEM_ID => Some(Self::ItemId),
            RATING => Some(Self::Rating),
            TIMESTAMP => Some(Self::Timestamp),
            _ => None,
        }
    }

    /// Contract name of the column.
    pub fn name(self) -> &'static str {
        match self {
            Self::UserId => USER_ID,
            Self::ItemId => ITEM_ID,
            Self::Rating => RATING,
            Self::Timestamp => TIMESTAMP,
        }
    }
}

/// Borrowed cell value returned by column access.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue<'a> {
    /// User or item identifier.
    Id(&'a str),
    /// Rating value.
    Rating(Rating),
    /// Timestamp value.
    Timestamp(Timestamp),
}

/// Ordered collection of interactions. Rows are not required to be sorted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionTable {
    records: Vec<InteractionRecord>,
}

impl InteractionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing records, keeping their order.
    pub fn from_records(records: Vec<InteractionRecord>) -> Self {
        Self { records }
    }

    /// Append a record.
    pub fn push(&mut self, record: InteractionRecord) {
        self.records.push(record);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows in table order.
    pub fn records(&self) -> &[InteractionRecord] {
        &self.records
    }

    /// Iterate over rows in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, InteractionRecord> {
        self.records.iter()
    }

    /// Consume the table and return its rows.
    pub fn into_records(self) -> Vec<InteractionRecord> {
        self.records
    }

    /// Values of the column called `name`, or `None` for an unknown column.
    pub fn column(&self, name: &str) -> Option<Vec<FieldValue<'_>>> {
        let column = Column::from_name(name)?;
        Some(self.records.iter().map(|row| row.value(column)).collect())
    }

    /// Number of distinct users in the table.
    pub fn user_count(&self) -> usize {
        let mut users: Vec<&str> = self.records.iter().map(|r| r.user_id.as_str()).collect();
        users.sort_unstable();
        users.dedup();
        users.len()
    }

    /// Fresh table holding copies of the rows at `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            records: indices.iter().map(|&idx| self.records[idx].clone()).collect(),
        }
    }
}

impl FromIterator<InteractionRecord> for InteractionTable {
    fn from_iter<I: IntoIterator<Item = InteractionRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a InteractionTable {
    type Item = &'a InteractionRecord;
    type IntoIter = std::slice::Iter<'a, InteractionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for InteractionTable {
    type Item = InteractionRecord;
    type IntoIter = std::vec::IntoIter<InteractionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// A (train, test) pair. The sides are disjoint and together cover the input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    /// Rows used for fitting.
    pub train: InteractionTable,
    /// Held-out rows.
    pub test: InteractionTable,
}

impl Partition {
    /// Pair up a train and a test table.
    pub fn new(train: InteractionTable, test: InteractionTable) -> Self {
        Self { train, test }
    }
}

/// One partition for hold-out strategies, `folds` partitions otherwise.
pub type PartitionSet = Vec<Partition>;

/// Inner (train, validation) partitions computed on an outer train side, plus the outer test side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NestedPartition {
    /// Partitions of the outer train side; each `test` member is a validation table.
    pub validation: PartitionSet,
    /// Test side of the outer partition.
    pub test: InteractionTable,
}

/// Externally supplied tables passed through unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct PreSplitTables {
    /// Training table.
    pub train: InteractionTable,
    /// Optional validation table.
    pub validation: Option<InteractionTable>,
    /// Test table.
    pub test: InteractionTable,
}

/// Result of a full splitting run.
#[derive(Clone, Debug, PartialEq)]
pub enum SplitOutcome {
    /// Tables loaded from `pre_split` paths.
    PreSplit(PreSplitTables),
    /// Train/test partitions without a validation level.
    Flat(PartitionSet),
    /// Train/validation partitions nested inside each outer test split.
    Nested(Vec<NestedPartition>),
}

impl SplitOutcome {
    /// Number of outer partitions (1 for pre-split tables).
    pub fn outer_len(&self) -> usize {
        match self {
            Self::PreSplit(_) => 1,
            Self::Flat(partitions) => partitions.len(),
            Self::Nested(nested) => nested.len(),
        }
    }
}

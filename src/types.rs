/// User identifier as it appears in the `userId` column.
/// Examples: `42`, `u_1093`
pub type UserId = String;
/// Item identifier as it appears in the `itemId` column.
/// Examples: `7`, `B00005N5PF`
pub type ItemId = String;
/// Explicit rating or implicit-feedback marker.
/// Examples: `4.0`, `1.0`
pub type Rating = f64;
/// Epoch seconds (or any comparable ordinal) of an interaction.
/// Example: `1609786061`
pub type Timestamp = i64;
/// Fold index assigned to a row by cross-validation.
pub type FoldIndex = usize;

/// Canonical case-preserved category display name.
/// Examples: `faces`, `Hair Color`
pub type CategoryName = String;
/// Normalized category lookup key (lower-cased when matching ignores case).
/// Examples: `faces`, `hair color`
pub type CategoryKey = String;
/// A single tag value, trimmed.
/// Examples: `smile`, `blue eyes`
pub type TagValue = String;
/// Stable hex digest used for cheap change detection.
/// Example: `9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08`
pub type Signature = String;
/// Diagnostic or debug message attached to metadata.
/// Examples: `File not found: /data/tags.csv`, `No tag column detected (tag/tags)`
pub type Diagnostic = String;

//! Category selection against loaded metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::metadata::TagMetadata;
use crate::signature::selection_signature;
use crate::types::{CategoryName, Signature, TagValue};

/// Immutable result of narrowing metadata to a subset of categories.
///
/// A new selection is a new value; selections are never edited in place.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TagSelection {
    /// Resolved canonical category names, ordered, deduplicated.
    pub selected_categories: Vec<CategoryName>,
    /// Deduplicated union of the selected categories' tags, in selection
    /// order then per-category first-seen order.
    pub category_tags: Vec<TagValue>,
    /// Signature of the metadata this selection was made against.
    pub metadata_signature: Option<Signature>,
    /// Signature of this particular selection (order-sensitive).
    pub selection_signature: Signature,
    /// When the selection was produced.
    pub timestamp: DateTime<Utc>,
    /// Unique id for this selection value.
    pub id: Uuid,
}

impl Default for TagSelection {
    fn default() -> Self {
        Self {
            selected_categories: Vec::new(),
            category_tags: Vec::new(),
            metadata_signature: None,
            selection_signature: String::new(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            id: Uuid::nil(),
        }
    }
}

impl TagSelection {
    /// Serialize into a detached payload value.
    pub fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Reconstruct a selection from a detached payload; unusable payloads
    /// yield an empty default selection.
    pub fn from_payload(payload: &Value) -> Self {
        serde_json::from_value(payload.clone()).unwrap_or_default()
    }
}

/// Split raw category input on newlines only, trimming and dropping empties.
///
/// Commas are never separators here: category display names may themselves
/// contain commas.
pub fn parse_categories_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalize candidate category names against the metadata's alias map.
///
/// Candidates that do not resolve to a known category are dropped silently.
/// Duplicates are removed, first occurrence wins, input order is preserved.
pub fn normalize_categories<'a, I>(candidates: I, metadata: &TagMetadata) -> Vec<CategoryName>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut normalized = Vec::new();
    for raw in candidates {
        let candidate = raw.trim();
        if candidate.is_empty() {
            continue;
        }
        let key = metadata.category_key(candidate);
        let resolved = metadata
            .category_alias_map
            .get(&key)
            .cloned()
            .unwrap_or_else(|| candidate.to_string());
        if metadata.tags_by_category.contains_key(&resolved)
            && !normalized.contains(&resolved)
        {
            normalized.push(resolved);
        }
    }
    normalized
}

/// Select categories named in `raw_categories` (newline-separated) from
/// `metadata`.
///
/// An empty or fully-unresolvable input yields an empty selection; this
/// function never defaults to "all categories". Defaulting on absent input is
/// the sampler's job.
pub fn select_categories(metadata: &TagMetadata, raw_categories: &str) -> TagSelection {
    let parsed = parse_categories_lines(raw_categories);
    let selected = normalize_categories(parsed.iter().map(String::as_str), metadata);

    let mut category_tags: Vec<TagValue> = Vec::new();
    for category in &selected {
        for tag in metadata.category_tags(category) {
            if !category_tags.contains(tag) {
                category_tags.push(tag.clone());
            }
        }
    }

    let selection_signature = selection_signature(metadata, &selected);
    TagSelection {
        selected_categories: selected,
        category_tags,
        metadata_signature: metadata.cache_signature.clone(),
        selection_signature,
        timestamp: Utc::now(),
        id: Uuid::new_v4(),
    }
}

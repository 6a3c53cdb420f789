//! The central tag metadata entity and the aggregator that builds it.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::constants::metadata::UNCATEGORIZED_LABEL;
use crate::parse::{parse_source, TagPair};
use crate::types::{CategoryKey, CategoryName, Diagnostic, Signature, TagValue};

/// Kind of source a [`TagMetadata`] was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Tabular source parsed with CSV rules.
    Csv,
    /// JSON array-of-objects source.
    Json,
    /// The file did not exist at resolution time.
    Missing,
}

/// Normalized in-memory tag data loaded from one source file.
///
/// Read-only once constructed. Invariants:
/// - `categories` and `tags_by_category` keys are the same set, in the same
///   first-seen order.
/// - `all_tags` is the globally deduplicated union of every category's tags,
///   ordered by first appearance across the whole source.
/// - `category_alias_map` maps each normalized key to exactly one canonical
///   display name.
/// - When `source_type` is [`SourceType::Missing`], all collections are empty
///   and `errors` is non-empty.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TagMetadata {
    /// Absolute filesystem identity of the source.
    pub resolved_path: String,
    /// The path as originally supplied by the caller.
    pub source_path: String,
    /// How the source was parsed (or that it was missing).
    pub source_type: SourceType,
    /// Modification time at load, absent when the file does not exist.
    pub mtime: Option<DateTime<Utc>>,
    /// Whether category matching folds case for the lifetime of this value.
    pub ignore_case: bool,
    /// Canonical category display names in first-seen order.
    pub categories: Vec<CategoryName>,
    /// Per-category deduplicated tag lists, keyed by display name.
    pub tags_by_category: IndexMap<CategoryName, Vec<TagValue>>,
    /// Globally deduplicated union of all tags in first-seen order.
    pub all_tags: Vec<TagValue>,
    /// Normalized key to canonical display name lookup.
    pub category_alias_map: IndexMap<CategoryKey, CategoryName>,
    /// Label substituted for blank or missing categories.
    pub uncategorized_label: String,
    /// Errors encountered while loading; never affect correctness downstream.
    pub errors: Vec<Diagnostic>,
    /// Parser and loader debug messages.
    pub debug_messages: Vec<Diagnostic>,
    /// Content signature, set after the first full load.
    pub cache_signature: Option<Signature>,
}

impl Default for TagMetadata {
    fn default() -> Self {
        Self {
            resolved_path: String::new(),
            source_path: String::new(),
            source_type: SourceType::Missing,
            mtime: None,
            ignore_case: true,
            categories: Vec::new(),
            tags_by_category: IndexMap::new(),
            all_tags: Vec::new(),
            category_alias_map: IndexMap::new(),
            uncategorized_label: UNCATEGORIZED_LABEL.to_string(),
            errors: Vec::new(),
            debug_messages: Vec::new(),
            cache_signature: None,
        }
    }
}

impl TagMetadata {
    /// Serialize into a detached payload value for socket-style transport.
    pub fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Reconstruct metadata from a detached payload.
    ///
    /// This is the single conversion boundary: internal components only ever
    /// operate on `TagMetadata`, never on loose payload maps. Unusable
    /// payloads yield empty default metadata rather than an error.
    pub fn from_payload(payload: &Value) -> Self {
        serde_json::from_value(payload.clone()).unwrap_or_default()
    }

    /// Compute the normalized lookup key for a category candidate.
    pub fn category_key(&self, candidate: &str) -> CategoryKey {
        if self.ignore_case {
            candidate.to_lowercase()
        } else {
            candidate.to_string()
        }
    }

    /// Tags for one canonical category, empty when unknown.
    pub fn category_tags(&self, category: &str) -> &[TagValue] {
        self.tags_by_category
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Accumulates parsed `(category, tags)` pairs into normalized collections.
///
/// Two independent dedupe scopes are maintained on purpose: a tag may recur
/// across categories and must appear in each category's own list, while the
/// global pool holds it exactly once.
pub struct TagAggregator {
    ignore_case: bool,
    alias_map: IndexMap<CategoryKey, CategoryName>,
    tags_by_category: IndexMap<CategoryName, Vec<TagValue>>,
    seen_by_category: IndexMap<CategoryName, HashSet<TagValue>>,
    all_tags: Vec<TagValue>,
    all_seen: HashSet<TagValue>,
}

impl TagAggregator {
    /// Create an aggregator with the given case-matching behavior.
    pub fn new(ignore_case: bool) -> Self {
        Self {
            ignore_case,
            alias_map: IndexMap::new(),
            tags_by_category: IndexMap::new(),
            seen_by_category: IndexMap::new(),
            all_tags: Vec::new(),
            all_seen: HashSet::new(),
        }
    }

    /// Register a category (the uncategorized label when blank) and fold its
    /// tags into both dedupe scopes.
    pub fn add_pair(&mut self, category: Option<&str>, tags: &[TagValue]) {
        let display = self.register_category(category);
        let list = self
            .tags_by_category
            .entry(display.clone())
            .or_default();
        let seen = self.seen_by_category.entry(display).or_default();
        for tag in tags {
            let tag = tag.trim();
            if tag.is_empty() {
                continue;
            }
            if !seen.contains(tag) {
                seen.insert(tag.to_string());
                list.push(tag.to_string());
            }
            if !self.all_seen.contains(tag) {
                self.all_seen.insert(tag.to_string());
                self.all_tags.push(tag.to_string());
            }
        }
    }

    /// Consume the aggregator and write its collections into `metadata`.
    pub fn finish_into(self, metadata: &mut TagMetadata) {
        metadata.categories = self.tags_by_category.keys().cloned().collect();
        metadata.tags_by_category = self.tags_by_category;
        metadata.all_tags = self.all_tags;
        metadata.category_alias_map = self.alias_map;
        metadata.uncategorized_label = UNCATEGORIZED_LABEL.to_string();
    }

    fn register_category(&mut self, category: Option<&str>) -> CategoryName {
        let mut display = category.unwrap_or("").trim().to_string();
        if display.is_empty() {
            display = UNCATEGORIZED_LABEL.to_string();
        }
        let key = if self.ignore_case {
            display.to_lowercase()
        } else {
            display.clone()
        };
        if let Some(existing) = self.alias_map.get(&key) {
            return existing.clone();
        }
        self.alias_map.insert(key, display.clone());
        self.tags_by_category.insert(display.clone(), Vec::new());
        self.seen_by_category
            .insert(display.clone(), HashSet::new());
        display
    }
}

/// Parse and aggregate a source file into fresh metadata.
///
/// `resolved_path` must already exist; missing files are represented upstream
/// by the cache. Parse failures degrade to empty collections plus
/// diagnostics, never an error.
pub fn load_tag_metadata(
    resolved_path: &Path,
    source_path: &str,
    ignore_case: bool,
) -> TagMetadata {
    let is_json = resolved_path
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let outcome = parse_source(resolved_path);
    debug!(
        path = %resolved_path.display(),
        pairs = outcome.pairs.len(),
        diagnostics = outcome.diagnostics.len(),
        "parsed tag source"
    );

    let mut aggregator = TagAggregator::new(ignore_case);
    for TagPair { category, tags } in &outcome.pairs {
        aggregator.add_pair(category.as_deref(), tags);
    }

    let mut metadata = TagMetadata {
        resolved_path: resolved_path.to_string_lossy().into_owned(),
        source_path: source_path.to_string(),
        source_type: if is_json {
            SourceType::Json
        } else {
            SourceType::Csv
        },
        mtime: file_mtime(resolved_path),
        ignore_case,
        debug_messages: outcome.diagnostics,
        ..TagMetadata::default()
    };
    aggregator.finish_into(&mut metadata);
    metadata
}

/// Read a file's modification time, absent on any failure.
pub fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

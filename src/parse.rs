//! Tolerant CSV/JSON source parsing into `(category, tags)` pairs.
//!
//! Parsing never fails hard: unreadable files, bad headers, and wrong JSON
//! shapes all degrade to an empty pair list plus diagnostics. Only a missing
//! file is treated specially, and that happens upstream in the cache.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::constants::parse::{
    CATEGORY_HEADERS, JSON_EXTENSION, MULTI_TAG_SEPARATORS, TAG_HEADER, TAGS_HEADER,
};
use crate::types::{Diagnostic, TagValue};

/// One parsed source entry: an optional raw category and its tags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagPair {
    /// Raw category value as it appeared in the source, if any.
    pub category: Option<String>,
    /// Tags contributed by this entry, split and trimmed.
    pub tags: Vec<TagValue>,
}

/// Result of parsing one source file.
#[derive(Clone, Debug, Default)]
pub struct ParseOutcome {
    /// Parsed `(category, tags)` pairs in source order.
    pub pairs: Vec<TagPair>,
    /// Messages describing anything skipped or recovered from.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a source file, dispatching on extension: `.json` goes to the JSON
/// parser, anything else is treated as CSV.
pub fn parse_source(path: &Path) -> ParseOutcome {
    let is_json = path
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(JSON_EXTENSION))
        .unwrap_or(false);
    if is_json {
        parse_json(path)
    } else {
        parse_csv(path)
    }
}

/// Split a delimited multi-tag field into individual trimmed tags.
///
/// `;`, `|`, and tab are normalized to commas first, so a literal separator
/// character cannot appear inside a single tag value.
pub fn split_tags_field(value: &str) -> Vec<TagValue> {
    if value.is_empty() {
        return Vec::new();
    }
    let normalized: String = value
        .chars()
        .map(|ch| {
            if MULTI_TAG_SEPARATORS.contains(&ch) {
                ','
            } else {
                ch
            }
        })
        .collect();
    normalized
        .split(',')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_csv(path: &Path) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let mut reader = match csv::ReaderBuilder::new().flexible(true).from_path(path) {
        Ok(reader) => reader,
        Err(err) => {
            outcome.diagnostics.push(format!("Error reading CSV: {err}"));
            return outcome;
        }
    };
    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(err) => {
            outcome.diagnostics.push(format!("Error reading CSV: {err}"));
            return outcome;
        }
    };
    let lowered: Vec<String> = headers
        .iter()
        .map(|header| header.trim().to_lowercase())
        .collect();
    if lowered.is_empty() {
        outcome
            .diagnostics
            .push("CSV missing headers; expected at least a tag column".to_string());
        return outcome;
    }
    let category_idx = lowered
        .iter()
        .position(|header| CATEGORY_HEADERS.contains(&header.as_str()));
    let tag_idx = lowered.iter().position(|header| header == TAG_HEADER);
    let tags_idx = lowered.iter().position(|header| header == TAGS_HEADER);
    debug!(
        ?category_idx,
        ?tag_idx,
        ?tags_idx,
        path = %path.display(),
        "csv column mapping"
    );
    if tag_idx.is_none() && tags_idx.is_none() {
        outcome
            .diagnostics
            .push("No tag column detected (tag/tags)".to_string());
        return outcome;
    }

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                outcome.diagnostics.push(format!("Error reading CSV: {err}"));
                break;
            }
        };
        let category = category_idx
            .and_then(|idx| record.get(idx))
            .map(str::to_string);
        let mut tags = Vec::new();
        if let Some(value) = tag_idx.and_then(|idx| record.get(idx)) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                tags.push(trimmed.to_string());
            }
        }
        if let Some(value) = tags_idx.and_then(|idx| record.get(idx)) {
            tags.extend(split_tags_field(value));
        }
        outcome.pairs.push(TagPair { category, tags });
    }
    outcome
}

fn parse_json(path: &Path) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            outcome
                .diagnostics
                .push(format!("Error reading JSON: {err}"));
            return outcome;
        }
    };
    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            outcome
                .diagnostics
                .push(format!("Error reading JSON: {err}"));
            return outcome;
        }
    };
    let entries = match value.as_array() {
        Some(entries) => entries,
        None => {
            outcome
                .diagnostics
                .push("JSON root must be a list of objects".to_string());
            return outcome;
        }
    };
    for entry in entries {
        let entry = match entry.as_object() {
            Some(entry) => entry,
            None => continue,
        };
        let category = entry
            .get("category")
            .and_then(Value::as_str)
            .map(str::to_string);
        let tags = match entry.get("tags") {
            Some(Value::String(field)) => split_tags_field(field),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.trim().to_string(),
                    other => other.to_string().trim().to_string(),
                })
                .filter(|tag| !tag.is_empty())
                .collect(),
            _ => Vec::new(),
        };
        outcome.pairs.push(TagPair { category, tags });
    }
    outcome
}

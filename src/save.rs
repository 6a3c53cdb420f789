//! Persists sampled tags to disk in text or line-delimited JSON form.
//!
//! This is the "save" collaborator: a side-effecting sink, so unlike the
//! loading pipeline its IO failures are real errors.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use serde_json::json;
use tracing::debug;

use crate::constants::sampler::DEFAULT_JOIN_DELIMITER;
use crate::errors::TagError;
use crate::types::TagValue;

/// On-disk layout for saved tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    /// The joined tag string followed by a newline.
    Txt,
    /// One JSON object per line: `{"tags": [...], "tags_str": "...",
    /// "timestamp": "..."}`.
    Jsonl,
}

/// Destination and formatting options for saving tags.
#[derive(Clone, Debug)]
pub struct SaveConfig {
    /// Target file path.
    pub path: PathBuf,
    /// Output layout.
    pub format: SaveFormat,
    /// Delimiter used to join tags for `txt` rows and `tags_str`.
    pub delimiter: String,
    /// Append to the file instead of truncating it.
    pub append: bool,
    /// Create missing parent directories before writing.
    pub ensure_dir: bool,
}

impl SaveConfig {
    /// Create a config targeting `path` with jsonl/append/ensure-dir
    /// defaults.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: SaveFormat::Jsonl,
            delimiter: DEFAULT_JOIN_DELIMITER.to_string(),
            append: true,
            ensure_dir: true,
        }
    }

    /// Set the output layout.
    pub fn with_format(mut self, format: SaveFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the join delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Toggle append versus overwrite.
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Toggle parent-directory creation.
    pub fn with_ensure_dir(mut self, ensure_dir: bool) -> Self {
        self.ensure_dir = ensure_dir;
        self
    }
}

/// Confirmation of a completed save.
#[derive(Clone, Debug)]
pub struct SaveReceipt {
    /// Path actually written.
    pub path: PathBuf,
    /// Number of tags persisted.
    pub tag_count: usize,
}

/// Persist `tags` according to `config`.
///
/// An empty target path is a hard failure; everything else propagates as IO
/// errors.
pub fn save_tags(config: &SaveConfig, tags: &[TagValue]) -> Result<SaveReceipt, TagError> {
    if config.path.as_os_str().is_empty() {
        return Err(TagError::MissingInput("file_path"));
    }
    if config.ensure_dir {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let joined = tags.join(&config.delimiter);
    let line = match config.format {
        SaveFormat::Txt => joined,
        SaveFormat::Jsonl => json!({
            "tags": tags,
            "tags_str": joined,
            "timestamp": Utc::now().to_rfc3339(),
        })
        .to_string(),
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(config.append)
        .write(true)
        .truncate(!config.append)
        .open(&config.path)?;
    writeln!(file, "{line}")?;
    debug!(path = %config.path.display(), tags = tags.len(), "saved tags");

    Ok(SaveReceipt {
        path: config.path.clone(),
        tag_count: tags.len(),
    })
}

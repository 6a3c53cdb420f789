//! Best-effort load notification for external listeners.

use chrono::{DateTime, Utc};

use crate::errors::TagError;
use crate::metadata::TagMetadata;
use crate::types::{CategoryName, TagValue};

/// Snapshot handed to observers after every load, hit or miss.
#[derive(Clone, Debug)]
pub struct LoadEvent {
    /// Absolute path of the loaded (or missing) source.
    pub resolved_path: String,
    /// The path as originally supplied.
    pub source_path: String,
    /// Canonical category names at load time.
    pub categories: Vec<CategoryName>,
    /// Global tag pool at load time.
    pub all_tags: Vec<TagValue>,
    /// Moment the notification was produced.
    pub timestamp: DateTime<Utc>,
}

impl LoadEvent {
    /// Build an event from freshly loaded metadata.
    pub fn from_metadata(metadata: &TagMetadata) -> Self {
        Self {
            resolved_path: metadata.resolved_path.clone(),
            source_path: metadata.source_path.clone(),
            categories: metadata.categories.clone(),
            all_tags: metadata.all_tags.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// Listener notified after each cache load.
///
/// Failures are logged and swallowed by the cache; they must never affect the
/// load's return value.
pub trait LoadObserver: Send + Sync {
    /// Handle one load notification.
    fn on_load(&self, event: &LoadEvent) -> Result<(), TagError>;
}

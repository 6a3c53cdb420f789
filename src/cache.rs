//! Process-lifetime metadata cache keyed by resolved path and case flag.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::broadcast::{LoadEvent, LoadObserver};
use crate::errors::TagError;
use crate::metadata::{file_mtime, load_tag_metadata, SourceType, TagMetadata};
use crate::resolve::resolve_path;
use crate::signature::{metadata_signature, missing_signature};

/// Parameters for one load call.
#[derive(Clone, Debug)]
pub struct LoadRequest {
    /// Path to the tags file; the one required input.
    pub file_path: String,
    /// Optional base directory tried first during resolution.
    pub base_dir: String,
    /// Whether category matching folds case.
    pub ignore_case: bool,
    /// Force a reload, bypassing and leaving the cache untouched.
    pub refresh: bool,
}

impl LoadRequest {
    /// Create a request for `file_path` with default options
    /// (no base dir, case-insensitive, no forced refresh).
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            base_dir: String::new(),
            ignore_case: true,
            refresh: false,
        }
    }

    /// Set the base directory tried first during resolution.
    pub fn with_base_dir(mut self, base_dir: impl Into<String>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Set case-folding behavior for category matching.
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Force a reload that bypasses the cache and does not store its result.
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }
}

/// Result of one load call.
#[derive(Clone, Debug)]
pub struct LoadOutcome {
    /// The loaded (or cached, or missing-placeholder) metadata.
    pub metadata: Arc<TagMetadata>,
    /// Whether the metadata came from the cache unchanged.
    pub cache_hit: bool,
}

/// Explicit cache object mapping `(resolved_path, ignore_case)` to the most
/// recently loaded metadata.
///
/// Staleness is detected by modification-time equality, not content hashing;
/// signatures are computed after a load for downstream change detection only.
/// The read-check-write sequence holds no lock across the parse, so two
/// callers racing on one key may both parse and both store. Last write wins
/// and both results are equally valid.
#[derive(Default)]
pub struct MetadataCache {
    entries: RwLock<HashMap<(PathBuf, bool), Arc<TagMetadata>>>,
    observers: Vec<Box<dyn LoadObserver>>,
}

impl MetadataCache {
    /// Create an empty cache with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer notified after every load.
    pub fn with_observer(mut self, observer: Box<dyn LoadObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Load tag metadata for `request`, consulting the cache unless
    /// `refresh` is set.
    ///
    /// A nonexistent file yields missing-source metadata (empty collections,
    /// non-empty errors, synthetic signature) without touching the cache
    /// entry for its key. The only error is an entirely absent `file_path`.
    pub fn load(&self, request: &LoadRequest) -> Result<LoadOutcome, TagError> {
        if request.file_path.is_empty() {
            return Err(TagError::MissingInput("file_path"));
        }

        let resolved = resolve_path(&request.file_path, &request.base_dir);
        if !resolved.exists() {
            let metadata = Arc::new(self.missing_metadata(request, &resolved));
            self.notify(&metadata);
            return Ok(LoadOutcome {
                metadata,
                cache_hit: false,
            });
        }

        let mtime = file_mtime(&resolved);
        let key = (resolved.clone(), request.ignore_case);
        if !request.refresh {
            let entries = self.entries.read().expect("metadata cache poisoned");
            if let Some(cached) = entries.get(&key) {
                if cached.mtime == mtime {
                    debug!(path = %resolved.display(), "metadata cache hit");
                    let metadata = Arc::clone(cached);
                    drop(entries);
                    self.notify(&metadata);
                    return Ok(LoadOutcome {
                        metadata,
                        cache_hit: true,
                    });
                }
                debug!(path = %resolved.display(), "metadata cache stale, reloading");
            }
        }

        let mut metadata = load_tag_metadata(&resolved, &request.file_path, request.ignore_case);
        metadata.mtime = mtime;
        metadata.cache_signature = Some(metadata_signature(&metadata));
        let metadata = Arc::new(metadata);
        if !request.refresh {
            let mut entries = self.entries.write().expect("metadata cache poisoned");
            entries.insert(key, Arc::clone(&metadata));
        }
        self.notify(&metadata);
        Ok(LoadOutcome {
            metadata,
            cache_hit: false,
        })
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .expect("metadata cache poisoned")
            .clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().expect("metadata cache poisoned").len()
    }

    /// Returns `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn missing_metadata(&self, request: &LoadRequest, resolved: &PathBuf) -> TagMetadata {
        let resolved_str = resolved.to_string_lossy().into_owned();
        TagMetadata {
            resolved_path: resolved_str.clone(),
            source_path: request.file_path.clone(),
            source_type: SourceType::Missing,
            ignore_case: request.ignore_case,
            errors: vec![format!("File not found: {resolved_str}")],
            debug_messages: vec!["File missing; returning empty metadata".to_string()],
            cache_signature: Some(missing_signature(&resolved_str, request.ignore_case)),
            ..TagMetadata::default()
        }
    }

    fn notify(&self, metadata: &TagMetadata) {
        if self.observers.is_empty() {
            return;
        }
        let event = LoadEvent::from_metadata(metadata);
        for observer in &self.observers {
            if let Err(err) = observer.on_load(&event) {
                warn!(error = %err, "load observer failed; continuing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn write_csv(dir: &std::path::Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn empty_file_path_is_the_one_hard_failure() {
        let cache = MetadataCache::new();
        let err = cache.load(&LoadRequest::new("")).unwrap_err();
        assert!(matches!(err, TagError::MissingInput("file_path")));
    }

    #[test]
    fn missing_file_yields_placeholder_without_caching() {
        let cache = MetadataCache::new();
        let outcome = cache
            .load(&LoadRequest::new("/nowhere/tags.csv"))
            .unwrap();
        assert!(!outcome.cache_hit);
        assert_eq!(outcome.metadata.source_type, SourceType::Missing);
        assert!(outcome.metadata.categories.is_empty());
        assert!(!outcome.metadata.errors.is_empty());
        assert_eq!(
            outcome.metadata.cache_signature.as_deref(),
            Some("missing:/nowhere/tags.csv:true")
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn second_load_of_unchanged_file_hits_with_equal_signature() {
        let temp = tempdir().unwrap();
        let path = write_csv(
            temp.path(),
            "tags.csv",
            "category,tag\nfaces,smile\nhair,blonde hair\n",
        );
        let cache = MetadataCache::new();
        let request = LoadRequest::new(path.to_string_lossy().into_owned());

        let first = cache.load(&request).unwrap();
        assert!(!first.cache_hit);
        let second = cache.load(&request).unwrap();
        assert!(second.cache_hit);
        assert_eq!(
            first.metadata.cache_signature,
            second.metadata.cache_signature
        );
        assert!(first.metadata.cache_signature.is_some());
    }

    #[test]
    fn touching_the_file_invalidates_the_entry() {
        let temp = tempdir().unwrap();
        let path = write_csv(temp.path(), "tags.csv", "category,tag\nfaces,smile\n");
        let cache = MetadataCache::new();
        let request = LoadRequest::new(path.to_string_lossy().into_owned());
        cache.load(&request).unwrap();

        // Force a different mtime; coarse filesystem clocks need a nudge.
        let newer = std::time::SystemTime::now() + std::time::Duration::from_secs(5);
        let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.set_modified(newer).unwrap();
        drop(file);

        let reloaded = cache.load(&request).unwrap();
        assert!(!reloaded.cache_hit);
    }

    #[test]
    fn refresh_bypasses_and_preserves_the_cached_entry() {
        let temp = tempdir().unwrap();
        let path = write_csv(temp.path(), "tags.csv", "category,tag\nfaces,smile\n");
        let cache = MetadataCache::new();
        let request = LoadRequest::new(path.to_string_lossy().into_owned());
        cache.load(&request).unwrap();
        assert_eq!(cache.len(), 1);

        let refreshed = cache.load(&request.clone().with_refresh(true)).unwrap();
        assert!(!refreshed.cache_hit);
        assert_eq!(cache.len(), 1);

        // The original entry still serves hits afterwards.
        let again = cache.load(&request).unwrap();
        assert!(again.cache_hit);
    }

    #[test]
    fn ignore_case_flag_is_part_of_the_key() {
        let temp = tempdir().unwrap();
        let path = write_csv(temp.path(), "tags.csv", "category,tag\nFaces,smile\n");
        let cache = MetadataCache::new();
        let path_str = path.to_string_lossy().into_owned();

        cache.load(&LoadRequest::new(path_str.clone())).unwrap();
        cache
            .load(&LoadRequest::new(path_str).with_ignore_case(false))
            .unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clear_empties_the_cache() {
        let temp = tempdir().unwrap();
        let path = write_csv(temp.path(), "tags.csv", "tag\nsmile\n");
        let cache = MetadataCache::new();
        cache
            .load(&LoadRequest::new(path.to_string_lossy().into_owned()))
            .unwrap();
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    struct CountingObserver {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl LoadObserver for CountingObserver {
        fn on_load(&self, event: &LoadEvent) -> Result<(), TagError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(!event.resolved_path.is_empty());
            if self.fail {
                return Err(TagError::Observer("scripted failure".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn observers_run_on_every_load_and_failures_are_swallowed() {
        let temp = tempdir().unwrap();
        let path = write_csv(temp.path(), "tags.csv", "category,tag\nfaces,smile\n");
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = MetadataCache::new()
            .with_observer(Box::new(CountingObserver {
                calls: Arc::clone(&calls),
                fail: true,
            }))
            .with_observer(Box::new(CountingObserver {
                calls: Arc::clone(&calls),
                fail: false,
            }));
        let request = LoadRequest::new(path.to_string_lossy().into_owned());

        let outcome = cache.load(&request).unwrap();
        assert!(!outcome.cache_hit);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let hit = cache.load(&request).unwrap();
        assert!(hit.cache_hit);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}

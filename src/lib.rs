#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Best-effort load notification for external listeners.
pub mod broadcast;
/// Metadata cache keyed by resolved path and case flag.
pub mod cache;
/// Centralized constants used across parsing, signatures, and sampling.
pub mod constants;
/// Tag metadata entity, aggregation, and payload conversion.
pub mod metadata;
/// Tolerant CSV/JSON source parsing.
pub mod parse;
/// Path resolution with home and environment expansion.
pub mod resolve;
/// Bounded random tag sampling.
pub mod sampler;
/// Persisting sampled tags to disk.
pub mod save;
/// Category selection against loaded metadata.
pub mod select;
/// Deterministic content signatures.
pub mod signature;
/// Shared type aliases.
pub mod types;

mod errors;

pub use broadcast::{LoadEvent, LoadObserver};
pub use cache::{LoadOutcome, LoadRequest, MetadataCache};
pub use errors::TagError;
pub use metadata::{load_tag_metadata, SourceType, TagAggregator, TagMetadata};
pub use parse::{parse_source, split_tags_field, ParseOutcome, TagPair};
pub use resolve::resolve_path;
pub use sampler::{sample_tags, CategoryScope, SampleRequest, SampleResult};
pub use save::{save_tags, SaveConfig, SaveFormat, SaveReceipt};
pub use select::{normalize_categories, parse_categories_lines, select_categories, TagSelection};
pub use signature::{metadata_signature, missing_signature, selection_signature};
pub use types::{CategoryKey, CategoryName, Diagnostic, Signature, TagValue};

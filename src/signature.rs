//! Deterministic content signatures for cheap change detection.
//!
//! These digests let downstream stages decide "nothing changed" without deep
//! comparison. They are not security boundaries; SHA-256 is used only for its
//! stability and collision resistance.

use sha2::{Digest, Sha256};

use crate::constants::signature::{MISSING_SIGNATURE_PREFIX, SIGNATURE_SEPARATOR};
use crate::metadata::TagMetadata;
use crate::types::Signature;

/// Digest metadata content: resolved path, mtime (0 when absent), case flag,
/// category sequence, and the global tag sequence, in that fixed order.
pub fn metadata_signature(metadata: &TagMetadata) -> Signature {
    let mut hasher = Sha256::new();
    hasher.update(metadata.resolved_path.as_bytes());
    let stamp = metadata
        .mtime
        .map(|mtime| mtime.timestamp_micros())
        .unwrap_or(0);
    hasher.update(stamp.to_string().as_bytes());
    hasher.update(metadata.ignore_case.to_string().as_bytes());
    hasher.update(metadata.categories.join(SIGNATURE_SEPARATOR).as_bytes());
    hasher.update(metadata.all_tags.join(SIGNATURE_SEPARATOR).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Digest a category selection against its metadata.
///
/// Selection order is part of the digest: callers treat ordering as
/// display-significant even though membership is a set.
pub fn selection_signature(metadata: &TagMetadata, selected: &[String]) -> Signature {
    let mut hasher = Sha256::new();
    let base = metadata
        .cache_signature
        .as_deref()
        .unwrap_or(&metadata.resolved_path);
    hasher.update(base.as_bytes());
    hasher.update(selected.join(SIGNATURE_SEPARATOR).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Synthetic signature assigned when the source file does not exist.
pub fn missing_signature(resolved_path: &str, ignore_case: bool) -> Signature {
    format!("{MISSING_SIGNATURE_PREFIX}:{resolved_path}:{ignore_case}")
}

use std::io;

use thiserror::Error;

/// Error type for tag loading, selection, and persistence failures.
///
/// Malformed or missing source files are deliberately *not* errors: they are
/// absorbed into [`TagMetadata`](crate::TagMetadata) diagnostics so downstream
/// stages always receive a well-formed, if empty, value. Only the absence of a
/// required identifying input and save-side IO surface here.
#[derive(Debug, Error)]
pub enum TagError {
    /// A required identifying argument was not supplied at all.
    #[error("required input '{0}' is missing")]
    MissingInput(&'static str),
    /// IO failure while persisting tags.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A load observer reported a failure. Swallowed by the cache; exposed so
    /// observer implementations have something to return.
    #[error("load observer failed: {0}")]
    Observer(String),
}

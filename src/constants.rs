/// Constants used by tag aggregation and category normalization.
pub mod metadata {
    /// Placeholder category substituted for blank or missing category values.
    pub const UNCATEGORIZED_LABEL: &str = "uncategorized";
}

/// Constants used by CSV/JSON source parsing.
pub mod parse {
    /// Separators normalized to commas before splitting multi-tag fields.
    pub const MULTI_TAG_SEPARATORS: [char; 3] = [';', '|', '\t'];
    /// Header names accepted (case-insensitively) for the category column.
    pub const CATEGORY_HEADERS: [&str; 2] = ["category", "cat"];
    /// Header name accepted for the single-tag column.
    pub const TAG_HEADER: &str = "tag";
    /// Header name accepted for the multi-tag column.
    pub const TAGS_HEADER: &str = "tags";
    /// File extension routed to the JSON parser; everything else is CSV.
    pub const JSON_EXTENSION: &str = "json";
}

/// Constants used by signature computation.
pub mod signature {
    /// Separator joining sequence fields before hashing.
    pub const SIGNATURE_SEPARATOR: &str = "||";
    /// Prefix of the synthetic signature assigned to missing sources.
    pub const MISSING_SIGNATURE_PREFIX: &str = "missing";
}

/// Constants used by sampling output formatting.
pub mod sampler {
    /// Default delimiter joining sampled tags into a display string.
    pub const DEFAULT_JOIN_DELIMITER: &str = ", ";
}

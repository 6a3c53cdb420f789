//! Bounded random tag sampling with pooled and per-category modes.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::constants::sampler::DEFAULT_JOIN_DELIMITER;
use crate::metadata::TagMetadata;
use crate::select::{normalize_categories, TagSelection};
use crate::types::{CategoryName, TagValue};

/// Which categories a sample draws from.
///
/// Only [`CategoryScope::All`] defaults to every category in the metadata; an
/// explicit list or selection is used as-is, even when it is empty, and an
/// empty pool simply yields an empty sample.
#[derive(Clone, Debug)]
pub enum CategoryScope {
    /// No category input at all: draw from every category in the metadata.
    All,
    /// Explicit category names, normalized against the alias map.
    Names(Vec<String>),
    /// A previously produced selection, re-normalized against the metadata.
    Selection(TagSelection),
}

/// Bounds and mode flags for one sampling call.
#[derive(Clone, Debug)]
pub struct SampleRequest {
    /// Inclusive lower bound on how many tags to draw.
    pub min_count: usize,
    /// Inclusive upper bound on how many tags to draw.
    pub max_count: usize,
    /// Seed for reproducible draws; `0` means free-running randomness.
    pub seed: u64,
    /// Draw without replacement when set; with replacement otherwise.
    pub unique_only: bool,
    /// Draw independently within each selected category and concatenate.
    pub per_category: bool,
    /// Delimiter joining the chosen tags into the display string.
    pub delimiter: String,
}

impl SampleRequest {
    /// Create a request with the given bounds and default modes
    /// (unique, pooled, unseeded, `", "` delimiter).
    pub fn new(min_count: usize, max_count: usize) -> Self {
        Self {
            min_count,
            max_count,
            seed: 0,
            unique_only: true,
            per_category: false,
            delimiter: DEFAULT_JOIN_DELIMITER.to_string(),
        }
    }

    /// Seed the draw; non-zero seeds make results reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Toggle sampling without replacement.
    pub fn with_unique_only(mut self, unique_only: bool) -> Self {
        self.unique_only = unique_only;
        self
    }

    /// Toggle independent per-category draws.
    pub fn with_per_category(mut self, per_category: bool) -> Self {
        self.per_category = per_category;
        self
    }

    /// Override the display-string join delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }
}

/// Outcome of one sampling call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleResult {
    /// Chosen tags joined with the request's delimiter.
    pub tags: String,
    /// Number of chosen tags.
    pub count: usize,
    /// The chosen tags in draw order.
    pub tags_list: Vec<TagValue>,
}

impl SampleResult {
    fn empty() -> Self {
        Self {
            tags: String::new(),
            count: 0,
            tags_list: Vec::new(),
        }
    }
}

/// Draw a bounded random sample of tags from `metadata`.
///
/// Bounds are swapped when inverted. Undersized pools clamp rather than
/// fail: a zero-tag pool yields zero tags, never an error. With a non-zero
/// seed the draw is fully reproducible for identical
/// `(seed, pool, bounds, mode)` inputs; the RNG is constructed per call, so
/// concurrent seeded samples do not interfere.
pub fn sample_tags(
    metadata: &TagMetadata,
    scope: &CategoryScope,
    request: &SampleRequest,
) -> SampleResult {
    let (min_count, max_count) = if request.min_count > request.max_count {
        (request.max_count, request.min_count)
    } else {
        (request.min_count, request.max_count)
    };

    let selected: Vec<CategoryName> = match scope {
        CategoryScope::All => metadata.categories.clone(),
        CategoryScope::Names(names) => {
            normalize_categories(names.iter().map(String::as_str), metadata)
        }
        CategoryScope::Selection(selection) => normalize_categories(
            selection.selected_categories.iter().map(String::as_str),
            metadata,
        ),
    };

    let mut rng = if request.seed != 0 {
        StdRng::seed_from_u64(request.seed)
    } else {
        StdRng::from_os_rng()
    };

    let chosen: Vec<TagValue> = if request.per_category {
        // Iteration follows selection order, which is explicit and stable,
        // so seeded per-category draws are reproducible. The single RNG
        // advances across categories in sequence.
        let mut all_chosen = Vec::new();
        for category in &selected {
            let pool = metadata.category_tags(category);
            if pool.is_empty() {
                continue;
            }
            all_chosen.extend(draw_from_pool(
                &mut rng,
                pool,
                min_count,
                max_count,
                request.unique_only,
            ));
        }
        all_chosen
    } else {
        let pool = gather_candidate_tags(metadata, &selected);
        draw_from_pool(&mut rng, &pool, min_count, max_count, request.unique_only)
    };

    if chosen.is_empty() {
        return SampleResult::empty();
    }
    SampleResult {
        tags: chosen.join(&request.delimiter),
        count: chosen.len(),
        tags_list: chosen,
    }
}

/// Deduplicated union of the selected categories' tags, in selection order
/// then per-category first-seen order.
fn gather_candidate_tags(metadata: &TagMetadata, categories: &[CategoryName]) -> Vec<TagValue> {
    let mut result = Vec::new();
    for category in categories {
        for tag in metadata.category_tags(category) {
            if !result.contains(tag) {
                result.push(tag.clone());
            }
        }
    }
    result
}

/// Draw between `min_count` and `max_count` tags from `pool`.
///
/// Unique draws clamp both bounds to the pool size and sample without
/// replacement; non-unique draws use the bounds unclamped and pick each tag
/// independently. The draw count is uniform over `[lower, upper]`, and an
/// inverted effective range yields nothing.
fn draw_from_pool(
    rng: &mut StdRng,
    pool: &[TagValue],
    min_count: usize,
    max_count: usize,
    unique_only: bool,
) -> Vec<TagValue> {
    if pool.is_empty() {
        return Vec::new();
    }
    let (lower, upper) = if unique_only {
        (min_count.min(pool.len()), max_count.min(pool.len()))
    } else {
        (min_count, max_count)
    };
    if upper < lower {
        return Vec::new();
    }
    let k = rng.random_range(lower..=upper);
    if k == 0 {
        return Vec::new();
    }
    if unique_only {
        pool.choose_multiple(rng, k).cloned().collect()
    } else {
        (0..k)
            .filter_map(|_| pool.choose(rng).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TagAggregator;
    use crate::select::select_categories;
    use std::collections::HashSet;

    fn sample_metadata() -> TagMetadata {
        let mut aggregator = TagAggregator::new(true);
        aggregator.add_pair(
            Some("faces"),
            &["smile".to_string(), "blue eyes".to_string()],
        );
        aggregator.add_pair(
            Some("hair"),
            &["blonde hair".to_string(), "short hair".to_string()],
        );
        aggregator.add_pair(Some("empty"), &[]);
        let mut metadata = TagMetadata {
            resolved_path: "/data/tags.csv".to_string(),
            ..TagMetadata::default()
        };
        aggregator.finish_into(&mut metadata);
        metadata
    }

    #[test]
    fn exact_bounds_yield_exactly_k_distinct_tags() {
        let metadata = sample_metadata();
        let result = sample_tags(
            &metadata,
            &CategoryScope::All,
            &SampleRequest::new(3, 3).with_seed(7),
        );
        assert_eq!(result.count, 3);
        let distinct: HashSet<&String> = result.tags_list.iter().collect();
        assert_eq!(distinct.len(), 3);
        for tag in &result.tags_list {
            assert!(metadata.all_tags.contains(tag));
        }
    }

    #[test]
    fn undersized_pool_clamps_to_pool_size() {
        let metadata = sample_metadata();
        let result = sample_tags(
            &metadata,
            &CategoryScope::Names(vec!["faces".to_string()]),
            &SampleRequest::new(5, 10).with_seed(3),
        );
        assert_eq!(result.count, 2);
    }

    #[test]
    fn inverted_bounds_are_swapped() {
        let metadata = sample_metadata();
        let result = sample_tags(
            &metadata,
            &CategoryScope::All,
            &SampleRequest::new(4, 2).with_seed(11),
        );
        assert!(result.count >= 2 && result.count <= 4);
    }

    #[test]
    fn identical_seed_and_inputs_are_deterministic() {
        let metadata = sample_metadata();
        let request = SampleRequest::new(1, 4).with_seed(12345);
        let first = sample_tags(&metadata, &CategoryScope::All, &request);
        let second = sample_tags(&metadata, &CategoryScope::All, &request);
        assert_eq!(first, second);
    }

    #[test]
    fn explicit_empty_scope_yields_empty_result() {
        let metadata = sample_metadata();
        let result = sample_tags(
            &metadata,
            &CategoryScope::Names(Vec::new()),
            &SampleRequest::new(1, 5).with_seed(1),
        );
        assert_eq!(result, SampleResult::empty());
    }

    #[test]
    fn unknown_categories_in_scope_resolve_to_nothing() {
        let metadata = sample_metadata();
        let result = sample_tags(
            &metadata,
            &CategoryScope::Names(vec!["nope".to_string()]),
            &SampleRequest::new(1, 5).with_seed(1),
        );
        assert_eq!(result.count, 0);
        assert!(result.tags.is_empty());
    }

    #[test]
    fn with_replacement_can_exceed_pool_size() {
        let metadata = sample_metadata();
        let result = sample_tags(
            &metadata,
            &CategoryScope::Names(vec!["faces".to_string()]),
            &SampleRequest::new(6, 6).with_seed(9).with_unique_only(false),
        );
        assert_eq!(result.count, 6);
        for tag in &result.tags_list {
            assert!(metadata.tags_by_category["faces"].contains(tag));
        }
    }

    #[test]
    fn per_category_draws_from_each_nonempty_category() {
        let metadata = sample_metadata();
        let result = sample_tags(
            &metadata,
            &CategoryScope::All,
            &SampleRequest::new(1, 1).with_seed(21).with_per_category(true),
        );
        // One tag from "faces", one from "hair"; "empty" is skipped.
        assert_eq!(result.count, 2);
        assert!(
            metadata.tags_by_category["faces"].contains(&result.tags_list[0])
        );
        assert!(
            metadata.tags_by_category["hair"].contains(&result.tags_list[1])
        );
    }

    #[test]
    fn per_category_seeded_runs_are_reproducible() {
        let metadata = sample_metadata();
        let request = SampleRequest::new(1, 2).with_seed(404).with_per_category(true);
        let first = sample_tags(&metadata, &CategoryScope::All, &request);
        let second = sample_tags(&metadata, &CategoryScope::All, &request);
        assert_eq!(first, second);
    }

    #[test]
    fn selection_scope_uses_the_selection_categories() {
        let metadata = sample_metadata();
        let selection = select_categories(&metadata, "hair");
        let result = sample_tags(
            &metadata,
            &CategoryScope::Selection(selection),
            &SampleRequest::new(2, 2).with_seed(5),
        );
        assert_eq!(result.count, 2);
        for tag in &result.tags_list {
            assert!(metadata.tags_by_category["hair"].contains(tag));
        }
    }

    #[test]
    fn custom_delimiter_joins_the_display_string() {
        let metadata = sample_metadata();
        let result = sample_tags(
            &metadata,
            &CategoryScope::Names(vec!["faces".to_string()]),
            &SampleRequest::new(2, 2).with_seed(2).with_delimiter(" | "),
        );
        assert_eq!(result.tags, result.tags_list.join(" | "));
    }

    #[test]
    fn zero_bounds_yield_empty_result() {
        let metadata = sample_metadata();
        let result = sample_tags(
            &metadata,
            &CategoryScope::All,
            &SampleRequest::new(0, 0).with_seed(1),
        );
        assert_eq!(result, SampleResult::empty());
    }
}

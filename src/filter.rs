//! Post-search filter pipeline.
//!
//! The criteria here are orthogonal to textual relevance: they compose
//! against an already-ranked result sequence without re-querying the
//! corpus. Every dimension is a conjunction term; an empty set or `None`
//! leaves that dimension unrestricted, never "exclude all". The relative
//! order of the input sequence is preserved.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::engine::Engine;
use crate::models::VariantKind;
use crate::search::{self, ScoredMatch, SearchHit, DEFAULT_LIMIT};

/// Compound record filters, one conjunction term per dimension.
#[derive(Debug, Clone, Default)]
pub struct RecordFilters {
    /// Keep records from these collections (empty = all).
    pub collections: Vec<String>,
    /// Keep records from these variants (empty = all).
    pub variants: Vec<VariantKind>,
    /// Inclusive lower bound on codepoint length.
    pub min_length: Option<usize>,
    /// Inclusive upper bound on codepoint length.
    pub max_length: Option<usize>,
    /// Keep only records with (true) or without (false) diacritics.
    pub diacritized: Option<bool>,
}

/// Match counts before and after the filter pass.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FilterReport {
    pub before: usize,
    pub after: usize,
}

/// Apply the filter conjunction to a result sequence, preserving order.
pub fn apply_filters(
    engine: &Engine,
    matches: Vec<ScoredMatch>,
    filters: &RecordFilters,
) -> (Vec<ScoredMatch>, FilterReport) {
    let before = matches.len();

    let kept: Vec<ScoredMatch> = matches
        .into_iter()
        .filter(|m| {
            let (collection, file, record) = engine.resolve(m.at);
            if !filters.collections.is_empty()
                && !filters.collections.iter().any(|c| c == &collection.id)
            {
                return false;
            }
            if !filters.variants.is_empty() && !filters.variants.contains(&file.variant) {
                return false;
            }
            if let Some(min) = filters.min_length {
                if record.length < min {
                    return false;
                }
            }
            if let Some(max) = filters.max_length {
                if record.length > max {
                    return false;
                }
            }
            if let Some(wanted) = filters.diacritized {
                if record.diacritized != wanted {
                    return false;
                }
            }
            true
        })
        .collect();

    let report = FilterReport {
        before,
        after: kept.len(),
    };
    (kept, report)
}

/// Options for [`advanced_search`].
#[derive(Debug, Clone)]
pub struct AdvancedOptions {
    pub filters: RecordFilters,
    pub limit: usize,
    pub offset: usize,
}

impl Default for AdvancedOptions {
    fn default() -> Self {
        AdvancedOptions {
            filters: RecordFilters::default(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Ranked response with filter observability counts.
#[derive(Debug, Clone, Serialize)]
pub struct AdvancedResponse {
    pub hits: Vec<SearchHit>,
    /// Matches remaining after the filter pass.
    pub total: usize,
    /// Matches produced by the search before filtering.
    pub pre_filter_total: usize,
    pub has_more: bool,
}

/// Fuzzy search over the whole corpus, then the filter pipeline, then
/// pagination.
pub fn advanced_search(
    engine: &Engine,
    query: &str,
    opts: &AdvancedOptions,
) -> Result<AdvancedResponse> {
    if let (Some(min), Some(max)) = (opts.filters.min_length, opts.filters.max_length) {
        if min > max {
            bail!("min_length {} exceeds max_length {}", min, max);
        }
    }

    let mut matches = search::collect_matches(engine, query, None, None, false)?;
    search::rank(&mut matches);

    let (kept, report) = apply_filters(engine, matches, &opts.filters);
    let page = search::paginate(engine, &kept, opts.limit, opts.offset);

    Ok(AdvancedResponse {
        hits: page.hits,
        total: page.total,
        pre_filter_total: report.before,
        has_more: page.has_more,
    })
}

//! Relevance-ranked search over the flattened corpus view.
//!
//! The match loop is a single linear scan of the flat view in corpus
//! encounter order. The corpus is read-only after load, so the scan needs
//! no locking and zero matches is an ordinary empty response. Readiness is
//! type-level: search takes an [`Engine`], which only exists after a
//! completed load.
//!
//! # Scoring
//!
//! One canonical formula, applied uniformly; exact mode is the
//! single-token case:
//!
//! 1. Per query token present in the case-folded text: non-overlapping
//!    occurrences × 100, plus 50 if the text starts with the token, plus
//!    25 per whole-word occurrence.
//! 2. Sum per-token scores, divide by √(textLength / 100), round to the
//!    nearest integer.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::engine::{Engine, FlatRecord};
use crate::models::VariantKind;
use crate::text;

pub const DEFAULT_LIMIT: usize = 20;

/// Knobs for a single search invocation.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Restrict matching to one collection.
    pub collection: Option<String>,
    /// Restrict matching to one variant.
    pub variant: Option<VariantKind>,
    /// Whole-phrase containment instead of per-token matching.
    pub exact: bool,
    pub limit: usize,
    pub offset: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            collection: None,
            variant: None,
            exact: false,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// A record matched by a query: its flat position plus the integer
/// relevance score.
#[derive(Debug, Clone, Copy)]
pub struct ScoredMatch {
    pub at: FlatRecord,
    pub score: i64,
}

/// One materialized search hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub collection_id: String,
    pub variant: VariantKind,
    pub record_id: u32,
    pub text: String,
    pub length: usize,
    pub diacritized: bool,
    pub relevance_score: i64,
}

/// One page of ranked results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub total: usize,
    pub has_more: bool,
}

/// Ranked, paginated search.
///
/// Rejects a query that is empty after trimming; zero matches returns an
/// empty page with `total` 0, never an error.
pub fn search(engine: &Engine, query: &str, opts: &SearchOptions) -> Result<SearchResponse> {
    let mut matches = collect_matches(
        engine,
        query,
        opts.collection.as_deref(),
        opts.variant,
        opts.exact,
    )?;
    rank(&mut matches);
    Ok(paginate(engine, &matches, opts.limit, opts.offset))
}

/// Scan the flat view and score every matching record, in corpus
/// encounter order.
pub(crate) fn collect_matches(
    engine: &Engine,
    query: &str,
    collection: Option<&str>,
    variant: Option<VariantKind>,
    exact: bool,
) -> Result<Vec<ScoredMatch>> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        bail!("query must not be empty");
    }

    let folded = trimmed.to_lowercase();
    let terms: Vec<&str> = if exact {
        vec![folded.as_str()]
    } else {
        folded.split_whitespace().collect()
    };

    let mut matches = Vec::new();
    for &at in engine.flat() {
        let (coll, file, record) = engine.resolve(at);
        if let Some(cid) = collection {
            if coll.id != cid {
                continue;
            }
        }
        if let Some(v) = variant {
            if file.variant != v {
                continue;
            }
        }

        let folded_text = record.text.to_lowercase();
        if !terms.iter().any(|t| folded_text.contains(t)) {
            continue;
        }

        matches.push(ScoredMatch {
            at,
            score: relevance_score(&folded_text, &terms, record.length),
        });
    }

    Ok(matches)
}

/// Stable score-descending order; ties keep corpus encounter order so
/// pagination is deterministic.
pub(crate) fn rank(matches: &mut [ScoredMatch]) {
    matches.sort_by(|a, b| b.score.cmp(&a.score));
}

pub(crate) fn paginate(
    engine: &Engine,
    ranked: &[ScoredMatch],
    limit: usize,
    offset: usize,
) -> SearchResponse {
    let total = ranked.len();
    let hits = ranked
        .iter()
        .skip(offset)
        .take(limit)
        .map(|m| materialize(engine, m))
        .collect();

    SearchResponse {
        hits,
        total,
        has_more: offset + limit < total,
    }
}

fn materialize(engine: &Engine, m: &ScoredMatch) -> SearchHit {
    let (coll, file, record) = engine.resolve(m.at);
    SearchHit {
        collection_id: coll.id.clone(),
        variant: file.variant,
        record_id: record.id,
        text: record.text.clone(),
        length: record.length,
        diacritized: record.diacritized,
        relevance_score: m.score,
    }
}

/// The canonical relevance formula over a case-folded text.
fn relevance_score(folded_text: &str, terms: &[&str], text_length: usize) -> i64 {
    let mut raw: i64 = 0;
    for term in terms {
        let occurrences = text::count_occurrences(folded_text, term) as i64;
        if occurrences == 0 {
            continue;
        }
        raw += occurrences * 100;
        if folded_text.starts_with(term) {
            raw += 50;
        }
        raw += 25 * text::whole_word_occurrences(folded_text, term) as i64;
    }

    let norm = (text_length as f64 / 100.0).sqrt();
    if norm > 0.0 {
        (raw as f64 / norm).round() as i64
    } else {
        raw
    }
}

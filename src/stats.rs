//! Corpus statistics.
//!
//! Everything here is derived on demand by a single linear pass over the
//! flattened view; the corpus is read-only after load, so nothing is
//! cached between invocations. An empty scope yields zeroed aggregates,
//! not an error.

use std::collections::HashMap;

use serde::Serialize;

use crate::engine::Engine;
use crate::models::VariantKind;

/// Restrict statistics to one collection and/or one variant.
#[derive(Debug, Clone, Default)]
pub struct StatsScope {
    pub collection: Option<String>,
    pub variant: Option<VariantKind>,
}

/// Cost caps for the term-frequency pass.
#[derive(Debug, Clone, Copy)]
pub struct StatsBudget {
    /// Tokens examined per record, capping cost on long texts.
    pub term_token_budget: usize,
    /// Terms reported.
    pub top_terms: usize,
}

impl Default for StatsBudget {
    fn default() -> Self {
        StatsBudget {
            term_token_budget: 64,
            top_terms: 25,
        }
    }
}

/// Fixed percentile ladder over the sorted length array.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LengthPercentiles {
    pub p10: usize,
    pub p25: usize,
    pub p50: usize,
    pub p75: usize,
    pub p90: usize,
    pub p95: usize,
    pub p99: usize,
}

/// Record count and share of the scoped total for one collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionShare {
    pub id: String,
    pub records: usize,
    pub share: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CorpusStats {
    pub total_records: usize,
    /// Codepoint count summed over all scoped records.
    pub total_chars: u64,
    pub mean_length: f64,
    pub median_length: usize,
    pub percentiles: LengthPercentiles,
    pub collections: Vec<CollectionShare>,
    pub top_terms: Vec<TermCount>,
}

/// Aggregate the scoped records in one pass.
pub fn compute_stats(engine: &Engine, scope: &StatsScope, budget: &StatsBudget) -> CorpusStats {
    let mut lengths: Vec<usize> = Vec::new();
    let mut total_chars: u64 = 0;
    let mut per_collection: HashMap<&str, usize> = HashMap::new();
    let mut term_counts: HashMap<String, usize> = HashMap::new();

    for &at in engine.flat() {
        let (collection, file, record) = engine.resolve(at);
        if let Some(ref cid) = scope.collection {
            if &collection.id != cid {
                continue;
            }
        }
        if let Some(v) = scope.variant {
            if file.variant != v {
                continue;
            }
        }

        lengths.push(record.length);
        total_chars += record.length as u64;
        *per_collection.entry(collection.id.as_str()).or_insert(0) += 1;

        for token in record
            .text
            .split_whitespace()
            .take(budget.term_token_budget)
        {
            *term_counts.entry(token.to_lowercase()).or_insert(0) += 1;
        }
    }

    let total = lengths.len();
    lengths.sort_unstable();

    // Index = floor(p/100 × total), clamped to the last element.
    let percentile = |p: usize| -> usize {
        if total == 0 {
            0
        } else {
            lengths[((p * total) / 100).min(total - 1)]
        }
    };

    let percentiles = LengthPercentiles {
        p10: percentile(10),
        p25: percentile(25),
        p50: percentile(50),
        p75: percentile(75),
        p90: percentile(90),
        p95: percentile(95),
        p99: percentile(99),
    };

    let mean_length = if total == 0 {
        0.0
    } else {
        total_chars as f64 / total as f64
    };

    // Shares in corpus order, restricted to collections present in scope.
    let collections = engine
        .corpus()
        .collections
        .iter()
        .filter_map(|c| {
            let records = *per_collection.get(c.id.as_str())?;
            Some(CollectionShare {
                id: c.id.clone(),
                records,
                share: records as f64 / total as f64,
            })
        })
        .collect();

    // Count descending, then term ascending for determinism.
    let mut top_terms: Vec<TermCount> = term_counts
        .into_iter()
        .map(|(term, count)| TermCount { term, count })
        .collect();
    top_terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
    top_terms.truncate(budget.top_terms);

    CorpusStats {
        total_records: total,
        total_chars,
        mean_length,
        median_length: percentiles.p50,
        percentiles,
        collections,
        top_terms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{LoadReport, LoadStrategy};
    use crate::models::{Collection, Corpus, FileVariant, Record};
    use crate::text;

    fn record(id: u32, text: &str) -> Record {
        Record {
            id,
            text: text.to_string(),
            length: text::codepoint_len(text),
            diacritized: text::has_diacritics(text),
        }
    }

    fn engine_of(collections: Vec<Collection>) -> Engine {
        let corpus = Corpus { collections };
        let report = LoadReport {
            strategy: LoadStrategy::Unified,
            duration_ms: 0,
            collections: corpus.collections.len(),
            records: corpus.total_records(),
            approx_bytes: 0,
            fingerprint: String::new(),
            loaded_at: chrono::Utc::now(),
        };
        Engine::new(corpus, report)
    }

    fn collection(id: &str, variant: VariantKind, texts: &[&str]) -> Collection {
        Collection {
            id: id.to_string(),
            name: id.to_string(),
            arabic_name: id.to_string(),
            files: vec![FileVariant {
                variant,
                records: texts
                    .iter()
                    .enumerate()
                    .map(|(i, t)| record(i as u32 + 1, t))
                    .collect(),
            }],
        }
    }

    #[test]
    fn test_totals_and_mean() {
        // Lengths 2, 4 and 6 codepoints.
        let engine = engine_of(vec![collection(
            "a",
            VariantKind::Regular,
            &["ab", "abcd", "abcdef"],
        )]);
        let stats = compute_stats(&engine, &StatsScope::default(), &StatsBudget::default());

        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.total_chars, 12);
        assert!((stats.mean_length - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_ladder_indexing() {
        // Ten records of lengths 10, 20, …, 100: index floor(p/100 × 10).
        let texts: Vec<String> = (1..=10).map(|i| "a".repeat(i * 10)).collect();
        let refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let engine = engine_of(vec![collection("a", VariantKind::Regular, &refs)]);

        let stats = compute_stats(&engine, &StatsScope::default(), &StatsBudget::default());
        assert_eq!(stats.percentiles.p10, 20);
        assert_eq!(stats.percentiles.p25, 30);
        assert_eq!(stats.percentiles.p50, 60);
        assert_eq!(stats.percentiles.p75, 80);
        assert_eq!(stats.percentiles.p90, 100);
        assert_eq!(stats.percentiles.p95, 100);
        assert_eq!(stats.percentiles.p99, 100);
        assert_eq!(stats.median_length, stats.percentiles.p50);
    }

    #[test]
    fn test_collection_shares() {
        let engine = engine_of(vec![
            collection("a", VariantKind::Regular, &["x", "y", "z"]),
            collection("b", VariantKind::Regular, &["w"]),
        ]);
        let stats = compute_stats(&engine, &StatsScope::default(), &StatsBudget::default());

        assert_eq!(stats.collections.len(), 2);
        assert_eq!(stats.collections[0].id, "a");
        assert_eq!(stats.collections[0].records, 3);
        assert!((stats.collections[0].share - 0.75).abs() < 1e-9);
        assert_eq!(stats.collections[1].records, 1);
    }

    #[test]
    fn test_scope_restricts_the_pass() {
        let engine = engine_of(vec![
            collection("a", VariantKind::Regular, &["x", "y"]),
            collection("b", VariantKind::FullyDiacritized, &["zَ"]),
        ]);

        let only_a = compute_stats(
            &engine,
            &StatsScope {
                collection: Some("a".to_string()),
                variant: None,
            },
            &StatsBudget::default(),
        );
        assert_eq!(only_a.total_records, 2);
        assert_eq!(only_a.collections.len(), 1);
        assert_eq!(only_a.collections[0].id, "a");

        let only_marked = compute_stats(
            &engine,
            &StatsScope {
                collection: None,
                variant: Some(VariantKind::FullyDiacritized),
            },
            &StatsBudget::default(),
        );
        assert_eq!(only_marked.total_records, 1);
    }

    #[test]
    fn test_empty_scope_is_zeroed_not_an_error() {
        let engine = engine_of(vec![collection("a", VariantKind::Regular, &["x"])]);
        let stats = compute_stats(
            &engine,
            &StatsScope {
                collection: Some("missing".to_string()),
                variant: None,
            },
            &StatsBudget::default(),
        );

        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.total_chars, 0);
        assert_eq!(stats.mean_length, 0.0);
        assert_eq!(stats.percentiles.p50, 0);
        assert!(stats.collections.is_empty());
        assert!(stats.top_terms.is_empty());
    }

    #[test]
    fn test_term_frequency_is_case_folded_and_ranked() {
        let engine = engine_of(vec![collection(
            "a",
            VariantKind::Regular,
            &["Nur NUR nur", "nur huda", "huda"],
        )]);
        let stats = compute_stats(&engine, &StatsScope::default(), &StatsBudget::default());

        assert_eq!(stats.top_terms[0].term, "nur");
        assert_eq!(stats.top_terms[0].count, 4);
        assert_eq!(stats.top_terms[1].term, "huda");
        assert_eq!(stats.top_terms[1].count, 2);
    }

    #[test]
    fn test_term_token_budget_caps_long_records() {
        let long_text = "نور ".repeat(50);
        let engine = engine_of(vec![collection(
            "a",
            VariantKind::Regular,
            &[long_text.trim()],
        )]);

        let budget = StatsBudget {
            term_token_budget: 5,
            top_terms: 25,
        };
        let stats = compute_stats(&engine, &StatsScope::default(), &budget);
        assert_eq!(stats.top_terms[0].count, 5);
    }

    #[test]
    fn test_top_terms_truncated_deterministically() {
        let engine = engine_of(vec![collection(
            "a",
            VariantKind::Regular,
            &["b a c a b a"],
        )]);
        let budget = StatsBudget {
            term_token_budget: 64,
            top_terms: 2,
        };
        let stats = compute_stats(&engine, &StatsScope::default(), &budget);

        assert_eq!(stats.top_terms.len(), 2);
        assert_eq!(stats.top_terms[0].term, "a");
        // "b" (2) outranks "c" (1).
        assert_eq!(stats.top_terms[1].term, "b");
    }
}

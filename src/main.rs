//! # Matn CLI (`matn`)
//!
//! The `matn` binary is the command-line interface to the corpus engine.
//! Every command loads the corpus from the configured data directory,
//! installs it into the shared state, and runs one query against it.
//!
//! ## Usage
//!
//! ```bash
//! matn --config ./matn.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `matn check` | Load the corpus and print the load report |
//! | `matn collections` | List collections with per-variant record counts |
//! | `matn records <collection>` | Paginated record listing |
//! | `matn get <collection> <record-id>` | Fetch one record |
//! | `matn search "<query>"` | Relevance-ranked search |
//! | `matn advanced "<query>"` | Search through the compound filter pipeline |
//! | `matn stats` | Corpus statistics |

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use matn::config::{self, Config};
use matn::engine::Engine;
use matn::filter::{self, AdvancedOptions, RecordFilters};
use matn::loader;
use matn::models::VariantKind;
use matn::search::{self, SearchOptions};
use matn::state::AppState;
use matn::stats::{self, StatsBudget, StatsScope};

/// Matn — an in-memory indexing and search engine for classical hadith
/// collections.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file naming the corpus data directory and query defaults.
#[derive(Parser)]
#[command(
    name = "matn",
    about = "Matn — an in-memory indexing and search engine for classical hadith collections",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./matn.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Load the corpus and print the load report.
    ///
    /// Shows which strategy resolved (sharded or unified), the collection
    /// and record totals, load duration, approximate memory footprint and
    /// the source fingerprint. Exits non-zero when no source resolves.
    Check,

    /// List collections with per-variant record counts.
    Collections,

    /// List records of one collection, paginated.
    Records {
        /// Collection identifier.
        collection: String,

        /// Restrict to one variant: `regular` or `fully-diacritized`.
        #[arg(long)]
        variant: Option<String>,

        /// Maximum records to return (clamped to `search.max_limit`).
        #[arg(long)]
        limit: Option<usize>,

        /// Records to skip.
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Fetch a single record by collection, id and variant.
    Get {
        /// Collection identifier.
        collection: String,

        /// Record identifier within the collection + variant.
        record: u32,

        /// Variant to read: `regular` or `fully-diacritized`.
        #[arg(long, default_value = "regular")]
        variant: String,
    },

    /// Search records, ranked by relevance.
    ///
    /// Fuzzy by default: the query is split on whitespace and a record
    /// matches when any token occurs in its text. With `--exact` the whole
    /// query must occur contiguously.
    Search {
        /// The search query string.
        query: String,

        /// Restrict matching to one collection.
        #[arg(long)]
        collection: Option<String>,

        /// Restrict matching to one variant.
        #[arg(long)]
        variant: Option<String>,

        /// Whole-phrase matching instead of per-token matching.
        #[arg(long)]
        exact: bool,

        /// Maximum results to return (clamped to `search.max_limit`).
        #[arg(long)]
        limit: Option<usize>,

        /// Results to skip.
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Search, then apply the compound filter pipeline.
    ///
    /// Filters compose as a conjunction; a dimension left empty is
    /// unrestricted. Prints match counts before and after filtering.
    Advanced {
        /// The search query string (fuzzy matching).
        query: String,

        /// Keep only these collections (repeatable).
        #[arg(long = "collection")]
        collections: Vec<String>,

        /// Keep only these variants (repeatable).
        #[arg(long = "variant")]
        variants: Vec<String>,

        /// Inclusive lower bound on record length (codepoints).
        #[arg(long)]
        min_length: Option<usize>,

        /// Inclusive upper bound on record length (codepoints).
        #[arg(long)]
        max_length: Option<usize>,

        /// Keep only records with (true) or without (false) diacritics.
        #[arg(long)]
        diacritized: Option<bool>,

        /// Maximum results to return (clamped to `search.max_limit`).
        #[arg(long)]
        limit: Option<usize>,

        /// Results to skip.
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Corpus statistics: totals, length percentiles, per-collection
    /// share and top terms.
    Stats {
        /// Restrict to one collection.
        #[arg(long)]
        collection: Option<String>,

        /// Restrict to one variant.
        #[arg(long)]
        variant: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    // Load once, install once; every command reads through the state
    // handle the way a serving boundary would.
    let (corpus, report) = loader::load_corpus(&cfg.corpus)?;
    let state = AppState::new();
    state.install(Engine::new(corpus, report));
    let Some(engine) = state.engine() else {
        bail!("corpus is not loaded");
    };

    match cli.command {
        Commands::Check => run_check(&engine),
        Commands::Collections => run_collections(&engine),
        Commands::Records {
            collection,
            variant,
            limit,
            offset,
        } => run_records(&cfg, &engine, &collection, variant, limit, offset),
        Commands::Get {
            collection,
            record,
            variant,
        } => run_get(&engine, &collection, record, &variant),
        Commands::Search {
            query,
            collection,
            variant,
            exact,
            limit,
            offset,
        } => run_search(&cfg, &engine, &query, collection, variant, exact, limit, offset),
        Commands::Advanced {
            query,
            collections,
            variants,
            min_length,
            max_length,
            diacritized,
            limit,
            offset,
        } => run_advanced(
            &cfg,
            &engine,
            &query,
            collections,
            variants,
            min_length,
            max_length,
            diacritized,
            limit,
            offset,
        ),
        Commands::Stats {
            collection,
            variant,
        } => run_stats(&cfg, &engine, collection, variant),
    }
}

/// Resolve a caller-supplied limit against the configured default and the
/// boundary clamp.
fn resolve_limit(cfg: &Config, limit: Option<usize>) -> Result<usize> {
    let limit = limit.unwrap_or(cfg.search.default_limit);
    if limit == 0 {
        bail!("limit must be > 0");
    }
    Ok(limit.min(cfg.search.max_limit))
}

fn parse_variant(variant: Option<String>) -> Result<Option<VariantKind>> {
    variant.map(|v| v.parse()).transpose()
}

fn run_check(engine: &Arc<Engine>) -> Result<()> {
    let report = engine.report();

    println!("Matn — Corpus Load Report");
    println!("=========================");
    println!();
    println!("  strategy:     {}", report.strategy);
    println!(
        "  loaded at:    {}",
        report.loaded_at.format("%Y-%m-%dT%H:%M:%SZ")
    );
    println!("  duration:     {} ms", report.duration_ms);
    println!("  collections:  {}", report.collections);
    println!("  records:      {}", report.records);
    println!("  footprint:    {}", format_bytes(report.approx_bytes));
    println!("  fingerprint:  {}", report.fingerprint);

    Ok(())
}

fn run_collections(engine: &Arc<Engine>) -> Result<()> {
    let summaries = engine.collection_summaries();

    println!("{:<16} {:>8}  {}", "ID", "RECORDS", "NAME");
    println!("{}", "-".repeat(64));
    for summary in &summaries {
        println!(
            "{:<16} {:>8}  {} ({})",
            summary.id, summary.total_records, summary.name, summary.arabic_name
        );
        for variant in &summary.variants {
            println!("{:<16} {:>8}    {}", "", variant.records, variant.variant);
        }
    }
    println!();
    println!("{} collections, {} records", summaries.len(), engine.total_records());

    Ok(())
}

fn run_records(
    cfg: &Config,
    engine: &Arc<Engine>,
    collection: &str,
    variant: Option<String>,
    limit: Option<usize>,
    offset: usize,
) -> Result<()> {
    let limit = resolve_limit(cfg, limit)?;
    let variant = parse_variant(variant)?;

    let Some(page) = engine.records(collection, variant, limit, offset) else {
        bail!("collection not found: {}", collection);
    };

    for record in &page.records {
        println!(
            "{:>6}  [{} | {} chars] {}",
            record.id, record.variant, record.length, record.text
        );
    }
    println!();
    println!(
        "total: {} (showing {} from offset {}, has more: {})",
        page.total,
        page.records.len(),
        offset,
        page.has_more
    );

    Ok(())
}

fn run_get(engine: &Arc<Engine>, collection: &str, record_id: u32, variant: &str) -> Result<()> {
    let variant: VariantKind = variant.parse()?;

    let Some(record) = engine.record(collection, record_id, variant) else {
        bail!(
            "record not found: {}/{}/{}",
            collection,
            variant,
            record_id
        );
    };

    println!("--- Record ---");
    println!("collection:  {}", record.collection_id);
    println!("variant:     {}", record.variant);
    println!("id:          {}", record.id);
    println!("length:      {}", record.length);
    println!("diacritized: {}", record.diacritized);
    println!();
    println!("--- Text ---");
    println!("{}", record.text);

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_search(
    cfg: &Config,
    engine: &Arc<Engine>,
    query: &str,
    collection: Option<String>,
    variant: Option<String>,
    exact: bool,
    limit: Option<usize>,
    offset: usize,
) -> Result<()> {
    let opts = SearchOptions {
        collection,
        variant: parse_variant(variant)?,
        exact,
        limit: resolve_limit(cfg, limit)?,
        offset,
    };

    let response = search::search(engine, query, &opts)?;
    if response.hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    print_hits(&response.hits, offset);
    println!(
        "total: {} (has more: {})",
        response.total, response.has_more
    );

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_advanced(
    cfg: &Config,
    engine: &Arc<Engine>,
    query: &str,
    collections: Vec<String>,
    variants: Vec<String>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    diacritized: Option<bool>,
    limit: Option<usize>,
    offset: usize,
) -> Result<()> {
    let variants = variants
        .into_iter()
        .map(|v| v.parse())
        .collect::<Result<Vec<VariantKind>>>()?;

    let opts = AdvancedOptions {
        filters: RecordFilters {
            collections,
            variants,
            min_length,
            max_length,
            diacritized,
        },
        limit: resolve_limit(cfg, limit)?,
        offset,
    };

    let response = filter::advanced_search(engine, query, &opts)?;
    println!(
        "matched {} records, {} after filters",
        response.pre_filter_total, response.total
    );
    if response.hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!();
    print_hits(&response.hits, offset);
    println!(
        "total: {} (has more: {})",
        response.total, response.has_more
    );

    Ok(())
}

fn run_stats(
    cfg: &Config,
    engine: &Arc<Engine>,
    collection: Option<String>,
    variant: Option<String>,
) -> Result<()> {
    let scope = StatsScope {
        collection,
        variant: parse_variant(variant)?,
    };
    let budget = StatsBudget {
        term_token_budget: cfg.stats.term_token_budget,
        top_terms: cfg.stats.top_terms,
    };

    let stats = stats::compute_stats(engine, &scope, &budget);

    println!("Matn — Corpus Stats");
    println!("===================");
    println!();
    println!("  records:      {}", stats.total_records);
    println!("  characters:   {}", stats.total_chars);
    println!("  mean length:  {:.1}", stats.mean_length);
    println!("  median:       {}", stats.median_length);
    println!();
    println!("  length percentiles:");
    println!(
        "    p10 {:>6}   p25 {:>6}   p50 {:>6}   p75 {:>6}",
        stats.percentiles.p10, stats.percentiles.p25, stats.percentiles.p50, stats.percentiles.p75
    );
    println!(
        "    p90 {:>6}   p95 {:>6}   p99 {:>6}",
        stats.percentiles.p90, stats.percentiles.p95, stats.percentiles.p99
    );

    if !stats.collections.is_empty() {
        println!();
        println!("  by collection:");
        println!("  {:<16} {:>8}   {}", "ID", "RECORDS", "SHARE");
        for share in &stats.collections {
            println!(
                "  {:<16} {:>8}   {:.1}%",
                share.id,
                share.records,
                share.share * 100.0
            );
        }
    }

    if !stats.top_terms.is_empty() {
        println!();
        println!("  top terms:");
        for term in &stats.top_terms {
            println!("  {:>6}  {}", term.count, term.term);
        }
    }

    Ok(())
}

fn print_hits(hits: &[matn::search::SearchHit], offset: usize) {
    for (i, hit) in hits.iter().enumerate() {
        println!(
            "{}. [{}] {}/{} #{}",
            offset + i + 1,
            hit.relevance_score,
            hit.collection_id,
            hit.variant,
            hit.record_id
        );
        println!("    {}", excerpt(&hit.text));
        println!();
    }
}

/// Display excerpt capped at 240 codepoints.
fn excerpt(text: &str) -> String {
    let mut out: String = text.chars().take(240).collect();
    if text.chars().nth(240).is_some() {
        out.push('…');
    }
    out
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

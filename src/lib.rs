//! # Matn
//!
//! An in-memory corpus indexing and search engine for classical hadith
//! collections.
//!
//! Matn loads a hierarchical text corpus (named collections →
//! text-rendering variants → individual records) from JSON source
//! documents at startup, then serves relevance-ranked, filterable,
//! paginated queries over it entirely from memory. The corpus is
//! read-only after load; statistics are recomputed per call.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   ┌──────────────┐   ┌─────────────────────┐
//! │ Source docs   │──▶│   Loader      │──▶│ Engine               │
//! │ manifest +    │   │ sharded →    │   │ corpus + collection │
//! │ shards/corpus │   │ unified      │   │ index + flat view   │
//! └───────────────┘   └──────────────┘   └──────────┬──────────┘
//!                                                   │
//!                        ┌──────────────┬───────────┤
//!                        ▼              ▼           ▼
//!                   ┌─────────┐   ┌──────────┐ ┌─────────┐
//!                   │ Search  │   │ Filters  │ │  Stats  │
//!                   └─────────┘   └──────────┘ └─────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Corpus data model |
//! | [`text`] | Diacritic detection and lexical helpers |
//! | [`loader`] | Sharded/unified corpus loading |
//! | [`engine`] | Collection index and lookups |
//! | [`search`] | Relevance-ranked search |
//! | [`filter`] | Advanced filter pipeline |
//! | [`stats`] | On-demand corpus statistics |
//! | [`state`] | Readiness handle for serving layers |

pub mod config;
pub mod engine;
pub mod filter;
pub mod loader;
pub mod models;
pub mod search;
pub mod state;
pub mod stats;
pub mod text;

pub use engine::Engine;
pub use filter::{advanced_search, AdvancedOptions, AdvancedResponse, RecordFilters};
pub use loader::{load_corpus, LoadReport, LoadStrategy};
pub use models::{Collection, Corpus, FileVariant, Record, VariantKind};
pub use search::{search, SearchOptions, SearchResponse};
pub use state::AppState;
pub use stats::{compute_stats, CorpusStats, StatsBudget, StatsScope};

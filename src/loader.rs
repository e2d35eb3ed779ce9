//! Corpus loading from source documents.
//!
//! Two strategies are tried in strict priority order: a sharded layout
//! (a manifest naming one JSON document per collection) and a unified
//! single-document fallback. A sharded load is all-or-nothing: any missing
//! shard, parse failure or declared-count divergence abandons the strategy
//! so a partial corpus is never served. If neither strategy resolves, the
//! load fails and the caller must not begin serving.

use std::collections::HashSet;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::CorpusConfig;
use crate::models::{Collection, Corpus, FileVariant, Record, VariantKind};
use crate::text;

/// Which source layout produced the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStrategy {
    Sharded,
    Unified,
}

impl std::fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStrategy::Sharded => f.write_str("sharded"),
            LoadStrategy::Unified => f.write_str("unified"),
        }
    }
}

/// Observability record for one load cycle.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub strategy: LoadStrategy,
    pub duration_ms: u64,
    pub collections: usize,
    pub records: usize,
    /// Rough in-memory footprint: text, names and per-record overhead.
    pub approx_bytes: u64,
    /// SHA-256 over the source bytes in load order.
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
}

// ============ Source document shapes ============

#[derive(Debug, Deserialize)]
struct ManifestDoc {
    collections: Vec<ManifestEntry>,
}

/// One manifest row: shard file name, declared record count, file size.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    file: String,
    count: usize,
    #[allow(dead_code)]
    size: u64,
}

/// A shard document wraps exactly one collection payload.
#[derive(Debug, Deserialize)]
struct ShardDoc {
    collection: CollectionDoc,
}

#[derive(Debug, Deserialize)]
struct UnifiedDoc {
    collections: Vec<CollectionDoc>,
}

#[derive(Debug, Deserialize)]
struct CollectionDoc {
    id: String,
    name: String,
    arabic_name: String,
    files: Vec<FileDoc>,
}

#[derive(Debug, Deserialize)]
struct FileDoc {
    variant: VariantKind,
    count: usize,
    hadiths: Vec<RecordDoc>,
}

#[derive(Debug, Deserialize)]
struct RecordDoc {
    id: u32,
    text: String,
}

// ============ Loading ============

/// Load the corpus from the configured data directory.
///
/// Tries the sharded layout first and falls back to the unified document.
/// The returned [`LoadReport`] names the strategy that succeeded. Fails
/// when neither source resolves, carrying both causes.
pub fn load_corpus(config: &CorpusConfig) -> Result<(Corpus, LoadReport)> {
    let started = Instant::now();

    let sharded_err = match load_sharded(config) {
        Ok((corpus, fingerprint)) => {
            return Ok(finish(corpus, LoadStrategy::Sharded, started, fingerprint));
        }
        Err(e) => e,
    };

    match load_unified(config) {
        Ok((corpus, fingerprint)) => Ok(finish(corpus, LoadStrategy::Unified, started, fingerprint)),
        Err(unified_err) => bail!(
            "no corpus source resolved: sharded: {:#}; unified: {:#}",
            sharded_err,
            unified_err
        ),
    }
}

fn load_sharded(config: &CorpusConfig) -> Result<(Corpus, String)> {
    let manifest_path = config.data_dir.join(&config.manifest);
    let manifest_bytes = std::fs::read(&manifest_path)
        .with_context(|| format!("failed to read manifest: {}", manifest_path.display()))?;
    let manifest: ManifestDoc = serde_json::from_slice(&manifest_bytes)
        .with_context(|| format!("failed to parse manifest: {}", manifest_path.display()))?;

    if manifest.collections.is_empty() {
        bail!("manifest lists no collections: {}", manifest_path.display());
    }

    let mut hasher = Sha256::new();
    hasher.update(&manifest_bytes);

    // Manifest order is corpus order.
    let mut docs = Vec::with_capacity(manifest.collections.len());
    for entry in &manifest.collections {
        let shard_path = config.data_dir.join(&entry.file);
        let shard_bytes = std::fs::read(&shard_path)
            .with_context(|| format!("failed to read shard: {}", shard_path.display()))?;
        let shard: ShardDoc = serde_json::from_slice(&shard_bytes)
            .with_context(|| format!("failed to parse shard: {}", shard_path.display()))?;

        let actual: usize = shard.collection.files.iter().map(|f| f.hadiths.len()).sum();
        if actual != entry.count {
            bail!(
                "shard {} declares {} records in the manifest but contains {}",
                entry.file,
                entry.count,
                actual
            );
        }

        hasher.update(&shard_bytes);
        docs.push(shard.collection);
    }

    Ok((build_corpus(docs)?, format!("{:x}", hasher.finalize())))
}

fn load_unified(config: &CorpusConfig) -> Result<(Corpus, String)> {
    let path = config.data_dir.join(&config.unified);
    let bytes = std::fs::read(&path)
        .with_context(|| format!("failed to read unified corpus: {}", path.display()))?;
    let doc: UnifiedDoc = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse unified corpus: {}", path.display()))?;

    if doc.collections.is_empty() {
        bail!("unified corpus lists no collections: {}", path.display());
    }

    let mut hasher = Sha256::new();
    hasher.update(&bytes);

    Ok((build_corpus(doc.collections)?, format!("{:x}", hasher.finalize())))
}

/// Convert parsed collection payloads into the in-memory tree, deriving
/// per-record length and diacritics and enforcing the model invariants.
fn build_corpus(docs: Vec<CollectionDoc>) -> Result<Corpus> {
    let mut seen: HashSet<String> = HashSet::with_capacity(docs.len());
    let mut collections = Vec::with_capacity(docs.len());

    for doc in docs {
        if !seen.insert(doc.id.clone()) {
            bail!("duplicate collection id: {}", doc.id);
        }

        let mut files = Vec::with_capacity(doc.files.len());
        for file in doc.files {
            if file.hadiths.len() != file.count {
                bail!(
                    "collection {} variant {} declares {} records but contains {}",
                    doc.id,
                    file.variant,
                    file.count,
                    file.hadiths.len()
                );
            }

            let records = file
                .hadiths
                .into_iter()
                .map(|h| Record {
                    id: h.id,
                    length: text::codepoint_len(&h.text),
                    diacritized: text::has_diacritics(&h.text),
                    text: h.text,
                })
                .collect();

            files.push(FileVariant {
                variant: file.variant,
                records,
            });
        }

        collections.push(Collection {
            id: doc.id,
            name: doc.name,
            arabic_name: doc.arabic_name,
            files,
        });
    }

    Ok(Corpus { collections })
}

fn finish(
    corpus: Corpus,
    strategy: LoadStrategy,
    started: Instant,
    fingerprint: String,
) -> (Corpus, LoadReport) {
    let report = LoadReport {
        strategy,
        duration_ms: started.elapsed().as_millis() as u64,
        collections: corpus.collections.len(),
        records: corpus.total_records(),
        approx_bytes: approx_footprint(&corpus),
        fingerprint,
        loaded_at: Utc::now(),
    };
    (corpus, report)
}

/// Rough held-memory estimate. Struct overhead is counted per record;
/// allocator slack is not.
fn approx_footprint(corpus: &Corpus) -> u64 {
    let mut bytes = 0u64;
    for collection in &corpus.collections {
        bytes += (collection.id.len() + collection.name.len() + collection.arabic_name.len()) as u64;
        for file in &collection.files {
            bytes += (file.records.len() * std::mem::size_of::<Record>()) as u64;
            for record in &file.records {
                bytes += record.text.len() as u64;
            }
        }
    }
    bytes
}

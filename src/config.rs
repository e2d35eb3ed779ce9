use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub stats: StatsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    /// Directory holding the source documents.
    pub data_dir: PathBuf,
    #[serde(default = "default_manifest")]
    pub manifest: String,
    #[serde(default = "default_unified")]
    pub unified: String,
}

fn default_manifest() -> String {
    "collections.json".to_string()
}
fn default_unified() -> String {
    "corpus.json".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Upper clamp applied to caller-supplied limits at the CLI boundary.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> usize {
    20
}
fn default_max_limit() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatsConfig {
    /// Tokens examined per record during the term-frequency pass.
    #[serde(default = "default_term_token_budget")]
    pub term_token_budget: usize,
    #[serde(default = "default_top_terms")]
    pub top_terms: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            term_token_budget: default_term_token_budget(),
            top_terms: default_top_terms(),
        }
    }
}

fn default_term_token_budget() -> usize {
    64
}
fn default_top_terms() -> usize {
    25
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate search
    if config.search.default_limit == 0 {
        anyhow::bail!("search.default_limit must be > 0");
    }
    if config.search.max_limit < config.search.default_limit {
        anyhow::bail!("search.max_limit must be >= search.default_limit");
    }

    // Validate stats
    if config.stats.term_token_budget == 0 {
        anyhow::bail!("stats.term_token_budget must be > 0");
    }
    if config.stats.top_terms == 0 {
        anyhow::bail!("stats.top_terms must be > 0");
    }

    Ok(config)
}

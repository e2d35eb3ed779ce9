//! Core data model for the matn corpus.
//!
//! These types represent the loaded, immutable corpus tree (collections →
//! file variants → records) plus the plain-data views handed to callers.
//! The tree is built once by the loader and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Textual rendering of a collection: plain text or fully marked with
/// diacritics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantKind {
    Regular,
    FullyDiacritized,
}

impl VariantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::Regular => "regular",
            VariantKind::FullyDiacritized => "fully-diacritized",
        }
    }
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VariantKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(VariantKind::Regular),
            "fully-diacritized" => Ok(VariantKind::FullyDiacritized),
            other => anyhow::bail!(
                "Unknown variant: '{}'. Use regular or fully-diacritized.",
                other
            ),
        }
    }
}

/// One narration entry within a collection variant.
///
/// `length` and `diacritized` are derived at ingestion and are not part of
/// the source documents.
#[derive(Debug, Clone)]
pub struct Record {
    /// Identifier, unique only within its collection + variant.
    pub id: u32,
    pub text: String,
    /// Codepoint count of `text` (not bytes).
    pub length: usize,
    /// Whether the diacritic detector found tashkeel marks in `text`.
    pub diacritized: bool,
}

/// One textual rendering of a collection with its ordered records.
#[derive(Debug, Clone)]
pub struct FileVariant {
    pub variant: VariantKind,
    pub records: Vec<Record>,
}

/// One named source text (e.g. one canonical book).
#[derive(Debug, Clone)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub arabic_name: String,
    pub files: Vec<FileVariant>,
}

impl Collection {
    /// Total records across all variants.
    pub fn record_count(&self) -> usize {
        self.files.iter().map(|f| f.records.len()).sum()
    }

    pub fn variant(&self, kind: VariantKind) -> Option<&FileVariant> {
        self.files.iter().find(|f| f.variant == kind)
    }
}

/// The complete in-memory aggregate of all collections.
///
/// Invariant: collection identifiers are unique (enforced by the loader).
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub collections: Vec<Collection>,
}

impl Corpus {
    pub fn total_records(&self) -> usize {
        self.collections.iter().map(|c| c.record_count()).sum()
    }
}

/// Per-variant record count within a [`CollectionSummary`].
#[derive(Debug, Clone, Serialize)]
pub struct VariantSummary {
    pub variant: VariantKind,
    pub records: usize,
}

/// Listing entry for one collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub id: String,
    pub name: String,
    pub arabic_name: String,
    pub variants: Vec<VariantSummary>,
    pub total_records: usize,
}

/// A single record resolved to plain data.
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    pub collection_id: String,
    pub variant: VariantKind,
    pub id: u32,
    pub text: String,
    pub length: usize,
    pub diacritized: bool,
}

/// One page of a record listing.
#[derive(Debug, Clone, Serialize)]
pub struct RecordPage {
    pub records: Vec<RecordView>,
    pub total: usize,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_round_trip() {
        for v in [VariantKind::Regular, VariantKind::FullyDiacritized] {
            let parsed: VariantKind = v.as_str().parse().unwrap();
            assert_eq!(parsed, v);
        }
    }

    #[test]
    fn test_variant_unknown_rejected() {
        let err = "mushakkal".parse::<VariantKind>().unwrap_err();
        assert!(err.to_string().contains("Unknown variant"));
    }

    #[test]
    fn test_variant_serde_tags() {
        let json = serde_json::to_string(&VariantKind::FullyDiacritized).unwrap();
        assert_eq!(json, "\"fully-diacritized\"");
        let back: VariantKind = serde_json::from_str("\"regular\"").unwrap();
        assert_eq!(back, VariantKind::Regular);
    }

    #[test]
    fn test_record_count_sums_variants() {
        let collection = Collection {
            id: "c".to_string(),
            name: "C".to_string(),
            arabic_name: "ج".to_string(),
            files: vec![
                FileVariant {
                    variant: VariantKind::Regular,
                    records: vec![
                        Record {
                            id: 1,
                            text: "a".to_string(),
                            length: 1,
                            diacritized: false,
                        },
                        Record {
                            id: 2,
                            text: "b".to_string(),
                            length: 1,
                            diacritized: false,
                        },
                    ],
                },
                FileVariant {
                    variant: VariantKind::FullyDiacritized,
                    records: vec![Record {
                        id: 1,
                        text: "أَ".to_string(),
                        length: 2,
                        diacritized: true,
                    }],
                },
            ],
        };
        assert_eq!(collection.record_count(), 3);
    }
}

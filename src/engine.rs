//! Loaded-corpus engine: collection index and flattened search view.
//!
//! An [`Engine`] is built once from a successfully loaded corpus and is
//! read-only afterwards, so every operation takes `&self` and concurrent
//! callers need no locking. Construction consumes the corpus; an `Engine`
//! value cannot exist before loading completed.

use std::collections::HashMap;

use crate::loader::LoadReport;
use crate::models::{
    Collection, CollectionSummary, Corpus, FileVariant, Record, RecordPage, RecordView,
    VariantKind, VariantSummary,
};

/// Position of one record inside the corpus tree.
///
/// The flattened view stores positions rather than copies, so every lookup
/// resolves to the single `Collection` instance owned by the corpus.
#[derive(Debug, Clone, Copy)]
pub struct FlatRecord {
    pub collection: usize,
    pub file: usize,
    pub record: usize,
}

/// Read-only query engine over a loaded corpus.
pub struct Engine {
    corpus: Corpus,
    index: HashMap<String, usize>,
    flat: Vec<FlatRecord>,
    report: LoadReport,
}

impl Engine {
    /// Build the collection index and flat view in one pass.
    pub fn new(corpus: Corpus, report: LoadReport) -> Self {
        let mut index = HashMap::with_capacity(corpus.collections.len());
        let mut flat = Vec::with_capacity(corpus.total_records());

        for (ci, collection) in corpus.collections.iter().enumerate() {
            index.insert(collection.id.clone(), ci);
            for (fi, file) in collection.files.iter().enumerate() {
                for ri in 0..file.records.len() {
                    flat.push(FlatRecord {
                        collection: ci,
                        file: fi,
                        record: ri,
                    });
                }
            }
        }

        Engine {
            corpus,
            index,
            flat,
            report,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn total_records(&self) -> usize {
        self.flat.len()
    }

    /// Every record position in corpus encounter order.
    pub(crate) fn flat(&self) -> &[FlatRecord] {
        &self.flat
    }

    /// Resolve a flat position to its collection, variant and record.
    pub(crate) fn resolve(&self, at: FlatRecord) -> (&Collection, &FileVariant, &Record) {
        let collection = &self.corpus.collections[at.collection];
        let file = &collection.files[at.file];
        (collection, file, &file.records[at.record])
    }

    /// O(1) lookup by collection identifier. `None` is the ordinary
    /// not-found value.
    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.index.get(id).map(|&ci| &self.corpus.collections[ci])
    }

    pub fn collection_summaries(&self) -> Vec<CollectionSummary> {
        self.corpus
            .collections
            .iter()
            .map(|c| CollectionSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                arabic_name: c.arabic_name.clone(),
                variants: c
                    .files
                    .iter()
                    .map(|f| VariantSummary {
                        variant: f.variant,
                        records: f.records.len(),
                    })
                    .collect(),
                total_records: c.record_count(),
            })
            .collect()
    }

    /// Paginated record listing for one collection, optionally restricted
    /// to a single variant. `None` for an unknown collection.
    pub fn records(
        &self,
        collection_id: &str,
        variant: Option<VariantKind>,
        limit: usize,
        offset: usize,
    ) -> Option<RecordPage> {
        let collection = self.collection(collection_id)?;

        let selected: Vec<(&FileVariant, &Record)> = collection
            .files
            .iter()
            .filter(|f| variant.map_or(true, |v| f.variant == v))
            .flat_map(|f| f.records.iter().map(move |r| (f, r)))
            .collect();

        let total = selected.len();
        let records = selected
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(f, r)| record_view(collection, f, r))
            .collect();

        Some(RecordPage {
            records,
            total,
            has_more: offset + limit < total,
        })
    }

    /// Single record lookup within one collection + variant.
    pub fn record(
        &self,
        collection_id: &str,
        record_id: u32,
        variant: VariantKind,
    ) -> Option<RecordView> {
        let collection = self.collection(collection_id)?;
        let file = collection.variant(variant)?;
        let record = file.records.iter().find(|r| r.id == record_id)?;
        Some(record_view(collection, file, record))
    }
}

fn record_view(collection: &Collection, file: &FileVariant, record: &Record) -> RecordView {
    RecordView {
        collection_id: collection.id.clone(),
        variant: file.variant,
        id: record.id,
        text: record.text.clone(),
        length: record.length,
        diacritized: record.diacritized,
    }
}

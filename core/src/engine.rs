use crate::error::{Error, Result, WordContext};
use crate::index::{DocMeta, InvertedIndex};
use crate::query::{parse_query, Query, StopWords};
use crate::scorer::{self, find_all_documents, rank};
use crate::terms::TermId;
use crate::tokenizer::{is_valid_token, split_into_words};
use crate::{compute_average_rating, DocId, Document, DocumentStatus, ExecutionMode, Predicate};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::{btree_map, BTreeMap};

/// In-memory TF-IDF search engine.
///
/// Mutating calls take `&mut self`; searches take `&self` and can run from
/// many threads at once. Wrap the engine in an `RwLock` to share it between
/// readers and a writer.
#[derive(Debug, Default)]
pub struct SearchEngine {
    stop_words: StopWords,
    index: InvertedIndex,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stop_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self { stop_words: StopWords::new(words)?, index: InvertedIndex::new() })
    }

    /// Stop words given as one space separated string, e.g. `"and in the"`.
    pub fn from_stop_text(text: &str) -> Result<Self> {
        Ok(Self { stop_words: StopWords::from_text(text)?, index: InvertedIndex::new() })
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    pub fn add_document(&mut self, id: DocId, text: &str, status: DocumentStatus, ratings: &[i32]) -> Result<()> {
        if id < 0 {
            return Err(Error::InvalidDocumentId { id, reason: "negative id" });
        }
        if self.index.contains(id) {
            return Err(Error::InvalidDocumentId { id, reason: "document already exists" });
        }
        let words: Vec<&str> = split_into_words(text)
            .into_iter()
            .filter(|w| !self.stop_words.contains(w))
            .collect();
        if let Some(bad) = words.iter().find(|w| !is_valid_token(w)) {
            return Err(Error::invalid_word(bad, WordContext::Document));
        }

        self.index.insert(id, &words, status, compute_average_rating(ratings));
        tracing::debug!(id, words = words.len(), ?status, "document added");
        Ok(())
    }

    pub fn remove_document(&mut self, id: DocId) {
        self.remove_document_with(ExecutionMode::Sequential, id);
    }

    pub fn remove_document_with(&mut self, mode: ExecutionMode, id: DocId) {
        if self.index.remove(id, mode) {
            tracing::debug!(id, ?mode, "document removed");
        }
    }

    pub fn parse_query<'q>(&self, raw_query: &'q str) -> Result<Query<'q>> {
        parse_query(raw_query, &self.stop_words, ExecutionMode::Sequential)
    }

    pub fn parse_query_with<'q>(&self, mode: ExecutionMode, raw_query: &'q str) -> Result<Query<'q>> {
        parse_query(raw_query, &self.stop_words, mode)
    }

    /// Top documents with status `Actual`.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_with(ExecutionMode::Sequential, raw_query, DocumentStatus::Actual)
    }

    pub fn find_top_documents_by<'p>(&self, raw_query: &str, predicate: impl Into<Predicate<'p>>) -> Result<Vec<Document>> {
        self.find_top_documents_with(ExecutionMode::Sequential, raw_query, predicate)
    }

    pub fn find_top_documents_with<'p>(
        &self,
        mode: ExecutionMode,
        raw_query: &str,
        predicate: impl Into<Predicate<'p>>,
    ) -> Result<Vec<Document>> {
        let query = self.parse_query_with(mode, raw_query)?;
        let matched = self.find_all_documents(&query, &predicate.into(), mode);
        Ok(rank(matched))
    }

    /// Unranked scoring pass, ordered by document id.
    pub fn find_all_documents(&self, query: &Query<'_>, predicate: &Predicate<'_>, mode: ExecutionMode) -> Vec<Document> {
        find_all_documents(&self.index, query, predicate, mode)
    }

    /// Plus terms of `raw_query` present in document `id`, with its status.
    ///
    /// An unknown id yields `(empty, Removed)`. A document holding any minus
    /// term yields an empty list with its real status. Use
    /// [`SearchEngine::contains_document`] to tell a missing document apart from
    /// one whose status really is `Removed`.
    pub fn match_document(&self, raw_query: &str, id: DocId) -> Result<(Vec<&str>, DocumentStatus)> {
        self.match_document_with(ExecutionMode::Sequential, raw_query, id)
    }

    pub fn match_document_with(
        &self,
        mode: ExecutionMode,
        raw_query: &str,
        id: DocId,
    ) -> Result<(Vec<&str>, DocumentStatus)> {
        let query = self.parse_query_with(mode, raw_query)?;
        let Some(meta) = self.index.document(id) else {
            return Ok((Vec::new(), DocumentStatus::Removed));
        };

        let in_document = |term: &&str| self.canonical_in_document(term, meta).is_some();
        let has_minus = if mode.is_parallel() {
            mode.install(|| query.minus.par_iter().any(in_document))
        } else {
            query.minus.iter().any(in_document)
        };
        if has_minus {
            return Ok((Vec::new(), meta.status));
        }

        let mut matched: Vec<&str> = if mode.is_parallel() {
            let shared = Mutex::new(Vec::with_capacity(query.plus.len()));
            mode.install(|| {
                query.plus.par_iter().for_each(|term| {
                    if let Some(canonical) = self.canonical_in_document(term, meta) {
                        shared.lock().push(canonical);
                    }
                })
            });
            shared.into_inner()
        } else {
            query.plus.iter().filter_map(|term| self.canonical_in_document(term, meta)).collect()
        };
        matched.sort_unstable();
        Ok((matched, meta.status))
    }

    fn canonical_in_document(&self, term: &str, meta: &DocMeta) -> Option<&str> {
        let tid: TermId = self.index.term_id(term)?;
        if meta.frequencies.contains_key(&tid) {
            self.index.term(tid)
        } else {
            None
        }
    }

    /// Term frequencies of document `id`; empty when it does not exist.
    pub fn word_frequencies(&self, id: DocId) -> BTreeMap<&str, f64> {
        self.index.word_frequencies(id)
    }

    /// IDF of `term` over the live documents; 0.0 when no document holds it.
    pub fn inverse_document_freq(&self, term: &str) -> f64 {
        let postings = self.index.term_id(term).and_then(|tid| self.index.postings(tid)).map_or(0, |p| p.len());
        scorer::inverse_document_freq(self.index.document_count(), postings)
    }

    pub fn document_count(&self) -> usize {
        self.index.document_count()
    }

    pub fn contains_document(&self, id: DocId) -> bool {
        self.index.contains(id)
    }

    /// Live document ids, ascending.
    pub fn ids(&self) -> std::iter::Copied<btree_map::Keys<'_, DocId, DocMeta>> {
        self.index.ids()
    }

    /// Distinct terms currently indexed.
    pub fn term_count(&self) -> usize {
        self.index.term_count()
    }
}

impl<'a> IntoIterator for &'a SearchEngine {
    type Item = DocId;
    type IntoIter = std::iter::Copied<btree_map::Keys<'a, DocId, DocMeta>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids()
    }
}

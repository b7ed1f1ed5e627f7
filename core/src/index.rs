use crate::terms::{TermId, TermStore};
use crate::{DocId, DocumentStatus, ExecutionMode};
use rayon::prelude::*;
use std::collections::{btree_map, BTreeMap};

/// Documents containing a term, with the term's frequency in each.
pub type Postings = BTreeMap<DocId, f64>;

#[derive(Debug, Clone)]
pub struct DocMeta {
    pub status: DocumentStatus,
    pub rating: i32,
    /// term -> share of the document's indexed words
    pub frequencies: BTreeMap<TermId, f64>,
}

/// Inverted index plus document store. `postings` is indexed by [`TermId`]; a
/// slot is non-empty exactly when its term is live in `terms`.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    terms: TermStore,
    postings: Vec<Postings>,
    docs: BTreeMap<DocId, DocMeta>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index already validated words. The id must not be live.
    pub fn insert(&mut self, id: DocId, words: &[&str], status: DocumentStatus, rating: i32) {
        let mut frequencies = BTreeMap::new();
        if !words.is_empty() {
            let inv_word_count = 1.0 / words.len() as f64;
            for word in words {
                let tid = self.terms.intern(word);
                *frequencies.entry(tid).or_insert(0.0) += inv_word_count;
            }
        }
        if self.postings.len() < self.terms.capacity() {
            self.postings.resize_with(self.terms.capacity(), Postings::new);
        }
        for (&tid, &tf) in &frequencies {
            self.postings[tid as usize].insert(id, tf);
        }
        self.docs.insert(id, DocMeta { status, rating, frequencies });
    }

    /// Tear down a document. Returns false when `id` is not live.
    ///
    /// Posting-list updates touch one slot per term and run in parallel under
    /// `ExecutionMode::Parallel`. Term release and the document entry itself are
    /// handled afterwards on the calling thread.
    pub fn remove(&mut self, id: DocId, mode: ExecutionMode) -> bool {
        let term_ids: Vec<TermId> = match self.docs.get(&id) {
            Some(meta) => meta.frequencies.keys().copied().collect(),
            None => return false,
        };

        let slots = disjoint_slots(&mut self.postings, &term_ids);
        let detach = |(postings, tid): (&mut Postings, TermId)| {
            postings.remove(&id);
            postings.is_empty().then_some(tid)
        };
        let emptied: Vec<TermId> = if mode.is_parallel() {
            mode.install(|| {
                slots
                    .into_par_iter()
                    .zip(term_ids.par_iter().copied())
                    .filter_map(detach)
                    .collect()
            })
        } else {
            slots.into_iter().zip(term_ids.iter().copied()).filter_map(detach).collect()
        };

        for tid in emptied {
            self.terms.release(tid);
        }
        self.docs.remove(&id);
        true
    }

    pub fn document(&self, id: DocId) -> Option<&DocMeta> {
        self.docs.get(&id)
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.docs.contains_key(&id)
    }

    pub fn document_count(&self) -> usize {
        self.docs.len()
    }

    pub fn ids(&self) -> std::iter::Copied<btree_map::Keys<'_, DocId, DocMeta>> {
        self.docs.keys().copied()
    }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.terms.get(term)
    }

    pub fn term(&self, tid: TermId) -> Option<&str> {
        self.terms.resolve(tid)
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn postings(&self, tid: TermId) -> Option<&Postings> {
        self.postings.get(tid as usize).filter(|p| !p.is_empty())
    }

    pub fn has_term(&self, tid: TermId, id: DocId) -> bool {
        self.postings.get(tid as usize).is_some_and(|p| p.contains_key(&id))
    }

    /// Term text -> frequency for one document, ordered by term.
    pub fn word_frequencies(&self, id: DocId) -> BTreeMap<&str, f64> {
        let Some(meta) = self.docs.get(&id) else {
            return BTreeMap::new();
        };
        meta.frequencies
            .iter()
            .filter_map(|(&tid, &tf)| self.terms.resolve(tid).map(|t| (t, tf)))
            .collect()
    }
}

/// Mutable references to the slots at `sorted_indices` (ascending, unique).
/// Indices out of range are skipped.
fn disjoint_slots<'a, T>(mut slice: &'a mut [T], sorted_indices: &[TermId]) -> Vec<&'a mut T> {
    let mut out = Vec::with_capacity(sorted_indices.len());
    let mut offset = 0usize;
    for &idx in sorted_indices {
        let idx = idx as usize;
        let rest = std::mem::take(&mut slice);
        if idx < offset || idx - offset >= rest.len() {
            slice = rest;
            continue;
        }
        let (_, from_idx) = rest.split_at_mut(idx - offset);
        let Some((slot, tail)) = from_idx.split_first_mut() else {
            break;
        };
        out.push(slot);
        slice = tail;
        offset = idx + 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_builds_postings_and_frequencies() {
        let mut idx = InvertedIndex::new();
        idx.insert(3, &["cat", "dog", "cat", "rat"], DocumentStatus::Actual, 2);
        assert_eq!(idx.document_count(), 1);
        assert_eq!(idx.term_count(), 3);

        let cat = idx.term_id("cat").unwrap();
        assert_eq!(idx.postings(cat).unwrap()[&3], 0.5);
        let freqs = idx.word_frequencies(3);
        assert_eq!(freqs.keys().copied().collect::<Vec<_>>(), vec!["cat", "dog", "rat"]);
        assert_eq!(freqs["dog"], 0.25);
    }

    #[test]
    fn empty_document_has_no_terms() {
        let mut idx = InvertedIndex::new();
        idx.insert(0, &[], DocumentStatus::Banned, 0);
        assert!(idx.contains(0));
        assert!(idx.word_frequencies(0).is_empty());
        assert_eq!(idx.term_count(), 0);
    }

    #[test]
    fn remove_releases_orphaned_terms() {
        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel(4)] {
            let mut idx = InvertedIndex::new();
            idx.insert(0, &["hello", "world"], DocumentStatus::Actual, 0);
            idx.insert(1, &["hello", "rust"], DocumentStatus::Actual, 0);

            assert!(idx.remove(0, mode));
            assert!(!idx.contains(0));
            assert_eq!(idx.term_id("world"), None);
            let hello = idx.term_id("hello").unwrap();
            assert_eq!(idx.postings(hello).unwrap().keys().copied().collect::<Vec<_>>(), vec![1]);
            assert_eq!(idx.term_count(), 2);
            assert!(!idx.remove(0, mode));
        }
    }

    #[test]
    fn released_slots_are_reused_cleanly() {
        let mut idx = InvertedIndex::new();
        idx.insert(0, &["alpha"], DocumentStatus::Actual, 0);
        idx.remove(0, ExecutionMode::Sequential);
        idx.insert(1, &["beta"], DocumentStatus::Actual, 0);
        let beta = idx.term_id("beta").unwrap();
        assert_eq!(idx.postings(beta).unwrap().len(), 1);
        assert!(!idx.has_term(beta, 0));
    }

    #[test]
    fn disjoint_slots_picks_requested() {
        let mut v = vec![0, 1, 2, 3, 4, 5];
        for slot in disjoint_slots(&mut v, &[0, 2, 5, 9]) {
            *slot += 10;
        }
        assert_eq!(v, vec![10, 1, 12, 3, 4, 15]);
    }
}

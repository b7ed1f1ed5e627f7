//! TF-IDF scoring and ranking.

use crate::concurrent_map::ConcurrentMap;
use crate::index::InvertedIndex;
use crate::terms::TermId;
use crate::{DocId, Document, ExecutionMode, Predicate, Query};
use rayon::prelude::*;
use std::cmp::Ordering;

pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;

/// Relevances closer than this are ranked as equal.
pub const RELEVANCE_EPSILON: f64 = 1e-6;

/// `ln(N / df)`, or 0.0 when no document holds the term.
pub fn inverse_document_freq(document_count: usize, postings_len: usize) -> f64 {
    if postings_len == 0 || document_count == 0 {
        return 0.0;
    }
    (document_count as f64 / postings_len as f64).ln()
}

/// Per-document contributions tagged by plus-term ordinal. Summing in ordinal
/// order makes the total independent of which worker added what first.
#[derive(Debug, Default, Clone)]
struct Contributions(Vec<(usize, f64)>);

impl Contributions {
    fn push(&mut self, ordinal: usize, value: f64) {
        self.0.push((ordinal, value));
    }

    fn total(mut self) -> f64 {
        self.0.sort_unstable_by_key(|&(ordinal, _)| ordinal);
        self.0.iter().fold(0.0, |acc, &(_, v)| acc + v)
    }
}

/// Every admitted document scored against `query`, ordered by id.
pub fn find_all_documents(
    index: &InvertedIndex,
    query: &Query<'_>,
    predicate: &Predicate<'_>,
    mode: ExecutionMode,
) -> Vec<Document> {
    let minus: Vec<TermId> = query.minus.iter().filter_map(|t| index.term_id(t)).collect();
    let plus: Vec<(usize, TermId)> = query
        .plus
        .iter()
        .filter(|t| !query.minus.contains(*t))
        .filter_map(|t| index.term_id(t))
        .enumerate()
        .collect();

    let document_count = index.document_count();
    let accumulator: ConcurrentMap<DocId, Contributions> = ConcurrentMap::new(mode.workers());

    let admitted = |id: DocId| -> bool {
        let Some(meta) = index.document(id) else {
            return false;
        };
        predicate.matches(id, meta.status, meta.rating) && !minus.iter().any(|&m| index.has_term(m, id))
    };

    if mode.is_parallel() {
        mode.install(|| {
            plus.par_iter().for_each(|&(ordinal, tid)| {
                let Some(postings) = index.postings(tid) else {
                    return;
                };
                let idf = inverse_document_freq(document_count, postings.len());
                postings.par_iter().for_each(|(&id, &tf)| {
                    if admitted(id) {
                        accumulator.access(id).push(ordinal, tf * idf);
                    }
                });
            })
        });
    } else {
        for &(ordinal, tid) in &plus {
            let Some(postings) = index.postings(tid) else {
                continue;
            };
            let idf = inverse_document_freq(document_count, postings.len());
            for (&id, &tf) in postings {
                if admitted(id) {
                    accumulator.access(id).push(ordinal, tf * idf);
                }
            }
        }
    }

    let matched: Vec<Document> = accumulator
        .into_ordinary_map()
        .into_iter()
        .filter_map(|(id, contributions)| {
            index.document(id).map(|meta| Document::new(id, contributions.total(), meta.rating))
        })
        .collect();
    tracing::trace!(plus = plus.len(), minus = minus.len(), matched = matched.len(), "scored query");
    matched
}

fn by_relevance(lhs: &Document, rhs: &Document) -> Ordering {
    rhs.relevance.total_cmp(&lhs.relevance).then(lhs.id.cmp(&rhs.id))
}

fn by_rating(lhs: &Document, rhs: &Document) -> Ordering {
    rhs.rating.cmp(&lhs.rating).then(lhs.id.cmp(&rhs.id))
}

/// Order by relevance descending; documents within [`RELEVANCE_EPSILON`] of the
/// first member of their run are ordered by rating descending, then id.
///
/// Runs are anchored on their most relevant member, so a chain of documents
/// each within epsilon of the next is split where it drifts past epsilon from
/// the anchor. Two neighbours across that split keep relevance order even when
/// they are themselves within epsilon.
pub fn sort_documents(documents: &mut [Document]) {
    documents.sort_by(by_relevance);
    let mut start = 0;
    while start < documents.len() {
        let top = documents[start].relevance;
        let end = documents[start..]
            .iter()
            .position(|d| top - d.relevance >= RELEVANCE_EPSILON)
            .map_or(documents.len(), |p| start + p);
        documents[start..end].sort_by(by_rating);
        start = end;
    }
}

/// Sort and keep the best [`MAX_RESULT_DOCUMENT_COUNT`].
pub fn rank(mut documents: Vec<Document>) -> Vec<Document> {
    sort_documents(&mut documents);
    documents.truncate(MAX_RESULT_DOCUMENT_COUNT);
    documents
}

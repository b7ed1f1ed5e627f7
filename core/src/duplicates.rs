use crate::{DocId, SearchEngine};
use std::collections::HashSet;

/// Remove every document whose set of words equals that of a document with a
/// smaller id. Frequencies are ignored. Returns the removed ids, ascending.
pub fn remove_duplicates(engine: &mut SearchEngine) -> Vec<DocId> {
    let duplicates: Vec<DocId> = {
        let mut seen: HashSet<Vec<&str>> = HashSet::new();
        engine
            .ids()
            .filter(|&id| {
                let words: Vec<&str> = engine.word_frequencies(id).into_keys().collect();
                !seen.insert(words)
            })
            .collect()
    };

    for &id in &duplicates {
        engine.remove_document(id);
        tracing::info!(id, "found duplicate document id");
    }
    duplicates
}

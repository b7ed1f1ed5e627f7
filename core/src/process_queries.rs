use crate::error::Result;
use crate::{Document, SearchEngine};
use rayon::prelude::*;

/// Run `find_top_documents` for every query in parallel. Results keep the
/// order of `queries`. The first invalid query fails the batch.
pub fn process_queries<S>(engine: &SearchEngine, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    queries.par_iter().map(|q| engine.find_top_documents(q.as_ref())).collect()
}

/// Like [`process_queries`], flattened into one list.
pub fn process_queries_joined<S>(engine: &SearchEngine, queries: &[S]) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
{
    let processed = process_queries(engine, queries)?;
    Ok(processed.into_iter().flatten().collect())
}

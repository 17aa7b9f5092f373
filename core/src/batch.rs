use crate::document::{DocId, Document, DocumentStatus};
use crate::engine::SearchEngine;
use crate::error::Result;
use crate::filter::{self, DocumentFilter};
use rayon::prelude::*;

/// Run every query against `engine` on the rayon pool, keeping ACTIVE documents.
///
/// Result `i` belongs to `queries[i]`. The first invalid query fails the whole batch.
pub fn process_queries<S>(engine: &SearchEngine, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    process_queries_with(engine, queries, filter::active())
}

/// [`process_queries`] with every query restricted by `filter`.
pub fn process_queries_with<S, F>(
    engine: &SearchEngine,
    queries: &[S],
    filter: F,
) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
    F: DocumentFilter + Sync,
{
    queries
        .par_iter()
        .map(|query| {
            engine.find_top_documents_with(query.as_ref(), |id: DocId, status: DocumentStatus, rating: i32| {
                filter.accepts(id, status, rating)
            })
        })
        .collect()
}

/// Like [`process_queries`], flattened: each query's hits stay together and keep their rank.
pub fn process_queries_joined<S>(engine: &SearchEngine, queries: &[S]) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
{
    process_queries_joined_with(engine, queries, filter::active())
}

pub fn process_queries_joined_with<S, F>(
    engine: &SearchEngine,
    queries: &[S],
    filter: F,
) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
    F: DocumentFilter + Sync,
{
    let per_query = process_queries_with(engine, queries, filter)?;
    let mut joined = Vec::with_capacity(per_query.iter().map(Vec::len).sum());
    for documents in per_query {
        joined.extend(documents);
    }
    Ok(joined)
}

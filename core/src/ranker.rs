//! TF-IDF relevance and result ordering.

use crate::document::{DocId, Document};
use crate::index::InvertedIndex;
use crate::query::Query;
use rayon::prelude::*;
use std::collections::HashMap;

pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;

/// Relative tolerance under which two relevances count as equal.
pub const EPSILON: f64 = 1e-6;

/// How a single query is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    #[default]
    Sequential,
    /// Accumulate relevance across plus terms on the rayon pool.
    Parallel,
}

pub fn relevance_tied(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs())
}

fn inverse_document_frequency(index: &InvertedIndex, df: usize) -> f64 {
    (index.len() as f64 / df as f64).ln()
}

/// Sum tf * idf over the plus terms of every document holding at least one of them,
/// then drop documents holding any minus term.
pub(crate) fn compute_relevance(
    index: &InvertedIndex,
    query: &Query<'_>,
    policy: Execution,
) -> HashMap<DocId, f64> {
    let mut relevance = match policy {
        Execution::Sequential => {
            let mut acc: HashMap<DocId, f64> = HashMap::new();
            for term in &query.plus {
                if let Some(postings) = index.postings(term) {
                    let idf = inverse_document_frequency(index, postings.len());
                    for (&id, &tf) in postings {
                        *acc.entry(id).or_insert(0.0) += tf * idf;
                    }
                }
            }
            acc
        }
        Execution::Parallel => query
            .plus
            .par_iter()
            .filter_map(|term| index.postings(term))
            .fold(HashMap::new, |mut acc: HashMap<DocId, f64>, postings| {
                let idf = inverse_document_frequency(index, postings.len());
                for (&id, &tf) in postings {
                    *acc.entry(id).or_insert(0.0) += tf * idf;
                }
                acc
            })
            .reduce(HashMap::new, |mut left, right| {
                for (id, score) in right {
                    *left.entry(id).or_insert(0.0) += score;
                }
                left
            }),
    };

    for term in &query.minus {
        if let Some(postings) = index.postings(term) {
            for id in postings.keys() {
                relevance.remove(id);
            }
        }
    }
    relevance
}

/// Order by relevance descending, ratings deciding between tied relevances, and keep
/// the first [`MAX_RESULT_DOCUMENT_COUNT`].
///
/// Ties are not transitive, so instead of a single comparator sort the documents are
/// put in strict relevance order and then insertion-sorted: a document moves ahead of
/// its neighbour while the two are tied and it has the higher rating. Every adjacent
/// pair ends up ordered. Ids break exact ties so the order is the same on every call.
pub fn rank(mut docs: Vec<Document>) -> Vec<Document> {
    docs.sort_by(|a, b| b.relevance.total_cmp(&a.relevance).then(a.id.cmp(&b.id)));

    for i in 1..docs.len() {
        let mut j = i;
        while j > 0 && outranks_tied(&docs[j], &docs[j - 1]) {
            docs.swap(j, j - 1);
            j -= 1;
        }
    }

    docs.truncate(MAX_RESULT_DOCUMENT_COUNT);
    docs
}

fn outranks_tied(doc: &Document, ahead: &Document) -> bool {
    relevance_tied(doc.relevance, ahead.relevance) && doc.rating > ahead.rating
}

use crate::document::{DocId, DocumentStatus};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Interned term. The same allocation is shared by the postings and every document containing it.
pub type Term = Arc<str>;

pub type TermFrequencies = BTreeMap<Term, f64>;

static NO_FREQUENCIES: TermFrequencies = BTreeMap::new();

#[derive(Debug, Clone)]
pub struct DocumentRecord {
    rating: i32,
    status: DocumentStatus,
    term_frequencies: TermFrequencies,
}

impl DocumentRecord {
    pub fn rating(&self) -> i32 {
        self.rating
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    /// term -> share of the document's indexed tokens equal to that term
    pub fn term_frequencies(&self) -> &TermFrequencies {
        &self.term_frequencies
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.term_frequencies.contains_key(term)
    }

    /// Distinct terms in ascending order.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.term_frequencies.keys().map(|t| &**t)
    }
}

/// Postings and per-document records kept in lockstep.
///
/// The document frequency of a term is the size of its postings map, so it can't
/// drift from the documents that contain the term. A term disappears from the
/// postings together with the last document containing it.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: BTreeMap<Term, BTreeMap<DocId, f64>>,
    docs: BTreeMap<DocId, DocumentRecord>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index already validated, non-empty `tokens` under a fresh `id`.
    pub(crate) fn insert(&mut self, id: DocId, status: DocumentStatus, rating: i32, tokens: &[&str]) {
        debug_assert!(!tokens.is_empty());
        debug_assert!(!self.docs.contains_key(&id));

        let mut counts: HashMap<&str, u32> = HashMap::new();
        for &token in tokens {
            *counts.entry(token).or_insert(0) += 1;
        }

        let total = tokens.len() as f64;
        let mut term_frequencies = TermFrequencies::new();
        for (token, count) in counts {
            let tf = f64::from(count) / total;
            let term = self.intern(token);
            self.postings.entry(Arc::clone(&term)).or_default().insert(id, tf);
            term_frequencies.insert(term, tf);
        }

        self.docs.insert(id, DocumentRecord { rating, status, term_frequencies });
    }

    /// Drop the document and every posting pointing at it.
    pub(crate) fn remove(&mut self, id: DocId) -> Option<DocumentRecord> {
        let record = self.docs.remove(&id)?;
        for term in record.term_frequencies.keys() {
            if let Some(docs) = self.postings.get_mut(term) {
                docs.remove(&id);
                if docs.is_empty() {
                    self.postings.remove(term);
                }
            }
        }
        Some(record)
    }

    fn intern(&self, token: &str) -> Term {
        match self.postings.get_key_value(token) {
            Some((term, _)) => Arc::clone(term),
            None => Arc::from(token),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.docs.contains_key(&id)
    }

    pub fn get(&self, id: DocId) -> Option<&DocumentRecord> {
        self.docs.get(&id)
    }

    /// Term frequencies of `id`, empty for an unknown document.
    pub fn word_frequencies(&self, id: DocId) -> &TermFrequencies {
        self.docs.get(&id).map_or(&NO_FREQUENCIES, |d| &d.term_frequencies)
    }

    /// doc id -> tf for every document containing `term`
    pub fn postings(&self, term: &str) -> Option<&BTreeMap<DocId, f64>> {
        self.postings.get(term)
    }

    /// Number of documents containing `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, BTreeMap::len)
    }

    /// Number of distinct indexed terms.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.postings.keys().map(|t| &**t)
    }

    /// Documents in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (DocId, &DocumentRecord)> + '_ {
        self.docs.iter().map(|(id, doc)| (*id, doc))
    }
}

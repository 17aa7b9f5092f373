use crate::document::{compute_average_rating, DocId, Document, DocumentStatus, MatchedDocument};
use crate::error::{Result, SearchError};
use crate::filter::{self, DocumentFilter};
use crate::index::{DocumentRecord, InvertedIndex, TermFrequencies};
use crate::query::parse_query;
use crate::ranker::{self, Execution};
use crate::tokenizer::{validate_term, StopWords};
use rayon::prelude::*;
use std::collections::HashMap;

/// In-memory search engine: stop words plus the inverted index they were applied to.
///
/// All mutation goes through [`add_document`](Self::add_document) and
/// [`remove_document`](Self::remove_document), which keep postings, document
/// frequencies and per-document term frequencies consistent. Queries take `&self`;
/// callers sharing an engine across threads must not interleave mutation with them.
#[derive(Debug, Default)]
pub struct SearchEngine {
    stop_words: StopWords,
    index: InvertedIndex,
}

impl SearchEngine {
    /// Engine whose stop words are the space separated terms of `stop_words_text`.
    pub fn new(stop_words_text: &str) -> Result<Self> {
        Ok(Self::with_stop_words(StopWords::parse(stop_words_text)?))
    }

    pub fn with_stop_words(stop_words: StopWords) -> Self {
        Self { stop_words, index: InvertedIndex::new() }
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Read-only view of the index.
    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Index `text` under `id`.
    ///
    /// Fails without touching the index if `id` is negative or taken, or if a term
    /// carries a control character. A text made only of stop words is skipped.
    pub fn add_document(
        &mut self,
        id: DocId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        if id < 0 {
            return Err(SearchError::invalid(format!("document id {id} can't be negative")));
        }
        if self.index.contains(id) {
            return Err(SearchError::invalid(format!("document {id} already exists")));
        }

        let tokens = self.stop_words.tokenize_no_stop(text);
        for token in &tokens {
            validate_term(token)?;
        }
        if tokens.is_empty() {
            tracing::debug!(doc_id = id, "no indexable terms, document skipped");
            return Ok(());
        }

        let rating = compute_average_rating(ratings);
        self.index.insert(id, status, rating, &tokens);
        tracing::debug!(doc_id = id, tokens = tokens.len(), rating, %status, "document indexed");
        Ok(())
    }

    /// Remove `id` and its postings. Returns whether the document existed.
    pub fn remove_document(&mut self, id: DocId) -> bool {
        match self.index.remove(id) {
            Some(record) => {
                tracing::debug!(doc_id = id, terms = record.term_frequencies().len(), "document removed");
                true
            }
            None => false,
        }
    }

    pub fn document_count(&self) -> usize {
        self.index.len()
    }

    /// Term frequencies of `id`; empty when the document is unknown.
    pub fn word_frequencies(&self, id: DocId) -> &TermFrequencies {
        self.index.word_frequencies(id)
    }

    pub fn document(&self, id: DocId) -> Option<&DocumentRecord> {
        self.index.get(id)
    }

    pub fn document_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.index.iter().map(|(id, _)| id)
    }

    /// Number of documents containing `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.index.document_frequency(term)
    }

    /// Number of distinct indexed terms.
    pub fn term_count(&self) -> usize {
        self.index.term_count()
    }

    /// Documents in ascending id order. Each call starts over.
    pub fn iter(&self) -> impl Iterator<Item = (DocId, &DocumentRecord)> + '_ {
        self.index.iter()
    }

    /// Top ACTIVE documents for `raw_query`.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_with(raw_query, filter::active())
    }

    pub fn find_top_documents_by_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.find_top_documents_with(raw_query, filter::with_status(status))
    }

    /// Top documents for `raw_query` among those accepted by `filter`.
    pub fn find_top_documents_with<F>(&self, raw_query: &str, filter: F) -> Result<Vec<Document>>
    where
        F: DocumentFilter,
    {
        let query = parse_query(raw_query, &self.stop_words)?;
        let relevance = ranker::compute_relevance(&self.index, &query, Execution::Sequential);
        Ok(self.select(relevance, &filter))
    }

    pub fn find_top_documents_with_policy<F>(
        &self,
        policy: Execution,
        raw_query: &str,
        filter: F,
    ) -> Result<Vec<Document>>
    where
        F: DocumentFilter + Sync,
    {
        let query = parse_query(raw_query, &self.stop_words)?;
        let relevance = ranker::compute_relevance(&self.index, &query, policy);
        Ok(self.select(relevance, &filter))
    }

    fn select<F>(&self, relevance: HashMap<DocId, f64>, filter: &F) -> Vec<Document>
    where
        F: DocumentFilter + ?Sized,
    {
        let candidates = relevance
            .into_iter()
            .filter_map(|(id, relevance)| {
                let record = self.index.get(id)?;
                filter
                    .accepts(id, record.status(), record.rating())
                    .then(|| Document { id, relevance, rating: record.rating() })
            })
            .collect();
        ranker::rank(candidates)
    }

    /// Plus terms of `raw_query` found in document `id`, with the document's status.
    ///
    /// Any minus term present in the document empties the term list. An unknown id
    /// yields no terms and [`DocumentStatus::Removed`].
    pub fn match_document(&self, raw_query: &str, id: DocId) -> Result<MatchedDocument> {
        self.match_document_with_policy(Execution::Sequential, raw_query, id)
    }

    pub fn match_document_with_policy(
        &self,
        policy: Execution,
        raw_query: &str,
        id: DocId,
    ) -> Result<MatchedDocument> {
        let query = parse_query(raw_query, &self.stop_words)?;
        let Some(record) = self.index.get(id) else {
            return Ok(MatchedDocument { terms: Vec::new(), status: DocumentStatus::Removed });
        };
        let status = record.status();

        let excluded = match policy {
            Execution::Sequential => query.minus.iter().any(|t| record.contains_term(t)),
            Execution::Parallel => query.minus.par_iter().any(|t| record.contains_term(t)),
        };
        if excluded {
            return Ok(MatchedDocument { terms: Vec::new(), status });
        }

        let terms = match policy {
            Execution::Sequential => query
                .plus
                .iter()
                .filter(|t| record.contains_term(t))
                .map(|t| t.to_string())
                .collect(),
            Execution::Parallel => query
                .plus
                .par_iter()
                .filter(|t| record.contains_term(t))
                .map(|t| t.to_string())
                .collect(),
        };
        Ok(MatchedDocument { terms, status })
    }
}

impl<'a> IntoIterator for &'a SearchEngine {
    type Item = (DocId, &'a DocumentRecord);
    type IntoIter = Box<dyn Iterator<Item = (DocId, &'a DocumentRecord)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat_city() -> SearchEngine {
        let mut engine = SearchEngine::default();
        engine
            .add_document(42, "cat in the city", DocumentStatus::Active, &[1, 2, 3])
            .unwrap();
        engine
    }

    #[test]
    fn added_document_is_found() {
        let engine = cat_city();
        assert_eq!(engine.document_count(), 1);
        assert_eq!(engine.find_top_documents("cat").unwrap().len(), 1);
        assert!(engine.find_top_documents("dog").unwrap().is_empty());
        assert!(engine.find_top_documents("").unwrap().is_empty());
    }

    #[test]
    fn stop_words_are_not_indexed() {
        let engine = cat_city();
        let found = engine.find_top_documents("in").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 42);

        let mut engine = SearchEngine::new("in the").unwrap();
        engine.add_document(42, "cat in the city", DocumentStatus::Active, &[1, 2, 3]).unwrap();
        assert!(engine.find_top_documents("in").unwrap().is_empty());
    }

    #[test]
    fn minus_terms_exclude_documents() {
        let engine = cat_city();
        assert!(engine.find_top_documents("cat -in").unwrap().is_empty());
        assert!(engine.find_top_documents("-city").unwrap().is_empty());
    }

    #[test]
    fn match_document_lists_present_plus_terms() {
        let engine = cat_city();
        let matched = engine.match_document("cat dog in", 42).unwrap();
        assert_eq!(matched.terms, vec!["cat".to_string(), "in".to_string()]);
        assert_eq!(matched.status, DocumentStatus::Active);

        let matched = engine.match_document("-cat dog in", 42).unwrap();
        assert!(matched.terms.is_empty());
        assert_eq!(matched.status, DocumentStatus::Active);
    }

    #[test]
    fn match_document_policies_agree() {
        let engine = cat_city();
        for query in ["cat dog in", "-cat in", "city the", "zebra"] {
            assert_eq!(
                engine.match_document_with_policy(Execution::Sequential, query, 42).unwrap(),
                engine.match_document_with_policy(Execution::Parallel, query, 42).unwrap(),
            );
        }
    }

    #[test]
    fn match_unknown_document_is_empty() {
        let engine = cat_city();
        let matched = engine.match_document("cat", 7).unwrap();
        assert!(matched.terms.is_empty());
        assert_eq!(matched.status, DocumentStatus::Removed);
    }

    #[test]
    fn match_validates_query_first() {
        let engine = cat_city();
        assert!(engine.match_document("--cat", 7).is_err());
    }

    #[test]
    fn relevance_sort_and_exclusion() {
        let mut engine = SearchEngine::default();
        engine.add_document(1, "cat says meow", DocumentStatus::Active, &[1, 2, 3]).unwrap();
        engine.add_document(2, "dog says owf", DocumentStatus::Active, &[1, 2, 3]).unwrap();
        engine.add_document(3, "wdtfs", DocumentStatus::Active, &[1, 2, 3]).unwrap();

        let ids: Vec<DocId> = engine.find_top_documents("cat says").unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let ids: Vec<DocId> = engine.find_top_documents("-cat says").unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn ratings_are_averaged() {
        for (ratings, expected) in [
            (vec![-4, 2, -7, -7], -4),
            (vec![1, 2, 3], 2),
            (vec![0, -1, 1], 0),
            (vec![], 0),
            (vec![4], 4),
        ] {
            let mut engine = SearchEngine::default();
            engine.add_document(1, "cat", DocumentStatus::Active, &ratings).unwrap();
            assert_eq!(engine.find_top_documents("cat").unwrap()[0].rating, expected);
        }
    }

    #[test]
    fn predicates_and_statuses_filter() {
        let engine = cat_city();
        assert_eq!(engine.find_top_documents_with("cat", |id: DocId, _: DocumentStatus, _: i32| id == 42).unwrap().len(), 1);
        assert!(engine.find_top_documents_with("cat", |_: DocId, _: DocumentStatus, r: i32| r == 7).unwrap().is_empty());
        assert_eq!(engine.find_top_documents_by_status("cat", DocumentStatus::Active).unwrap().len(), 1);
        assert!(engine.find_top_documents_by_status("cat", DocumentStatus::Banned).unwrap().is_empty());
    }

    #[test]
    fn relevance_values() {
        let mut engine = SearchEngine::new("и в на").unwrap();
        engine.add_document(0, "белый кот и модный ошейник", DocumentStatus::Active, &[8, -3]).unwrap();
        engine.add_document(1, "пушистый кот пушистый хвост", DocumentStatus::Active, &[7, 2, 7]).unwrap();
        engine.add_document(2, "ухоженный пёс выразительные глаза", DocumentStatus::Active, &[5, -12, 2, 1]).unwrap();
        engine.add_document(3, "ухоженный скворец евгений", DocumentStatus::Banned, &[9]).unwrap();

        let found = engine.find_top_documents("пушистый ухоженный кот").unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].id, 1);
        assert!((found[0].relevance - 0.866434).abs() < 1e-6);
        assert!((found[1].relevance - 0.173287).abs() < 1e-6);
        assert!((found[2].relevance - 0.173287).abs() < 1e-6);
        // tied relevance, higher rating first
        assert_eq!(found[1].id, 0);
        assert_eq!(found[2].id, 2);
    }

    #[test]
    fn parallel_policy_matches_sequential() {
        let mut engine = SearchEngine::new("и в на").unwrap();
        engine.add_document(0, "белый кот и модный ошейник", DocumentStatus::Active, &[8, -3]).unwrap();
        engine.add_document(1, "пушистый кот пушистый хвост", DocumentStatus::Active, &[7, 2, 7]).unwrap();
        engine.add_document(2, "ухоженный пёс выразительные глаза", DocumentStatus::Active, &[5, -12, 2, 1]).unwrap();

        let query = "пушистый ухоженный кот -ошейник";
        let seq = engine.find_top_documents_with_policy(Execution::Sequential, query, filter::active()).unwrap();
        let par = engine.find_top_documents_with_policy(Execution::Parallel, query, filter::active()).unwrap();
        let seq_ids: Vec<DocId> = seq.iter().map(|d| d.id).collect();
        let par_ids: Vec<DocId> = par.iter().map(|d| d.id).collect();
        assert_eq!(seq_ids, par_ids);
        for (a, b) in seq.iter().zip(&par) {
            assert!((a.relevance - b.relevance).abs() < 1e-12);
        }
    }

    #[test]
    fn invalid_ids_are_rejected() {
        let mut engine = SearchEngine::default();
        assert!(matches!(
            engine.add_document(-1, "cat", DocumentStatus::Active, &[]),
            Err(SearchError::InvalidArgument(_))
        ));
        engine.add_document(5, "cat", DocumentStatus::Active, &[]).unwrap();
        assert!(matches!(
            engine.add_document(5, "dog", DocumentStatus::Active, &[]),
            Err(SearchError::InvalidArgument(_))
        ));
        assert_eq!(engine.document_count(), 1);
        assert_eq!(engine.document_frequency("dog"), 0);
    }

    #[test]
    fn failed_add_leaves_index_untouched() {
        let mut engine = SearchEngine::default();
        engine.add_document(1, "cat dog", DocumentStatus::Active, &[]).unwrap();
        assert!(engine.add_document(2, "cat bi\u{3}rd", DocumentStatus::Active, &[]).is_err());
        assert_eq!(engine.document_count(), 1);
        assert_eq!(engine.document_frequency("cat"), 1);
        assert_eq!(engine.term_count(), 2);
    }

    #[test]
    fn stop_word_only_document_is_skipped() {
        let mut engine = SearchEngine::new("and the").unwrap();
        engine.add_document(1, "the and the", DocumentStatus::Active, &[5]).unwrap();
        engine.add_document(2, "   ", DocumentStatus::Active, &[5]).unwrap();
        assert_eq!(engine.document_count(), 0);
        // the id stays free
        engine.add_document(1, "cat", DocumentStatus::Active, &[]).unwrap();
        assert_eq!(engine.document_count(), 1);
    }

    #[test]
    fn remove_document_updates_frequencies() {
        let mut engine = SearchEngine::default();
        engine.add_document(1, "cat dog", DocumentStatus::Active, &[]).unwrap();
        engine.add_document(2, "cat bird", DocumentStatus::Active, &[]).unwrap();
        assert!(engine.remove_document(1));
        assert!(!engine.remove_document(1));
        assert_eq!(engine.document_frequency("dog"), 0);
        assert_eq!(engine.document_frequency("cat"), 1);
        assert!(engine.word_frequencies(1).is_empty());
        assert_eq!(engine.find_top_documents("dog").unwrap().len(), 0);
    }

    #[test]
    fn iteration_restarts() {
        let mut engine = SearchEngine::default();
        for id in [3, 1, 2] {
            engine.add_document(id, "cat", DocumentStatus::Active, &[]).unwrap();
        }
        let first: Vec<DocId> = engine.iter().map(|(id, _)| id).collect();
        let second: Vec<DocId> = (&engine).into_iter().map(|(id, _)| id).collect();
        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(first, second);
    }
}

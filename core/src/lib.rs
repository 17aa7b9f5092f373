//! In-memory document index with TF-IDF ranking, plus/minus queries, predicate
//! filtering, duplicate removal, batch querying and a request history window.

pub mod batch;
pub mod dedup;
pub mod document;
pub mod engine;
pub mod error;
pub mod filter;
pub mod index;
pub mod query;
pub mod ranker;
pub mod request_queue;
pub mod tokenizer;

pub use batch::{process_queries, process_queries_joined, process_queries_joined_with, process_queries_with};
pub use dedup::remove_duplicates;
pub use document::{DocId, Document, DocumentStatus, MatchedDocument};
pub use engine::SearchEngine;
pub use error::{Result, SearchError};
pub use filter::DocumentFilter;
pub use index::{DocumentRecord, InvertedIndex, Term, TermFrequencies};
pub use query::{parse_query, Query};
pub use ranker::{Execution, EPSILON, MAX_RESULT_DOCUMENT_COUNT};
pub use request_queue::{RequestQueue, REQUEST_WINDOW};
pub use tokenizer::StopWords;

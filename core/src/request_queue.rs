use crate::document::{Document, DocumentStatus};
use crate::engine::SearchEngine;
use crate::error::Result;
use crate::filter::{self, DocumentFilter};
use std::collections::VecDeque;

/// One simulated day of requests, one per minute.
pub const REQUEST_WINDOW: usize = 1440;

/// Remembers whether each of the last [`REQUEST_WINDOW`] queries came back empty.
///
/// Not synchronized: wrap it in a lock to share it.
#[derive(Debug)]
pub struct RequestQueue {
    requests: VecDeque<bool>,
    capacity: usize,
    no_result_requests: usize,
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::with_capacity(REQUEST_WINDOW)
    }

    /// A window of `capacity` requests; at least one is always kept.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { requests: VecDeque::with_capacity(capacity), capacity, no_result_requests: 0 }
    }

    /// Run a default (ACTIVE only) search and record its outcome.
    pub fn add_find_request(&mut self, engine: &SearchEngine, raw_query: &str) -> Result<Vec<Document>> {
        self.add_find_request_with(engine, raw_query, filter::active())
    }

    pub fn add_find_request_by_status(
        &mut self,
        engine: &SearchEngine,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.add_find_request_with(engine, raw_query, filter::with_status(status))
    }

    /// Run a filtered search and record its outcome. Failed queries aren't recorded.
    pub fn add_find_request_with<F>(
        &mut self,
        engine: &SearchEngine,
        raw_query: &str,
        filter: F,
    ) -> Result<Vec<Document>>
    where
        F: DocumentFilter,
    {
        let found = engine.find_top_documents_with(raw_query, filter)?;
        self.record(found.is_empty());
        Ok(found)
    }

    /// Empty-result requests currently in the window.
    pub fn no_result_requests(&self) -> usize {
        self.no_result_requests
    }

    /// Requests currently in the window.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn record(&mut self, empty: bool) {
        if self.requests.len() == self.capacity {
            if let Some(true) = self.requests.pop_front() {
                self.no_result_requests -= 1;
            }
        }
        if empty {
            self.no_result_requests += 1;
        }
        self.requests.push_back(empty);
    }
}

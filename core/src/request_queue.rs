use crate::error::Result;
use crate::{Document, DocumentStatus, Predicate, SearchEngine};
use std::collections::VecDeque;

/// Number of most recent requests kept, one per minute of a day.
pub const REQUEST_WINDOW: usize = 1440;

#[derive(Debug, Clone, Copy)]
struct QueryResult {
    time: u64,
    is_empty: bool,
}

/// Tracks how many of the recent searches came back empty.
#[derive(Debug)]
pub struct RequestQueue<'a> {
    engine: &'a SearchEngine,
    requests: VecDeque<QueryResult>,
    current_time: u64,
    empty_requests: usize,
}

impl<'a> RequestQueue<'a> {
    pub fn new(engine: &'a SearchEngine) -> Self {
        Self { engine, requests: VecDeque::with_capacity(REQUEST_WINDOW), current_time: 0, empty_requests: 0 }
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        self.add_find_request_by(raw_query, DocumentStatus::Actual)
    }

    /// Failed queries are not recorded.
    pub fn add_find_request_by<'p>(&mut self, raw_query: &str, predicate: impl Into<Predicate<'p>>) -> Result<Vec<Document>> {
        let results = self.engine.find_top_documents_by(raw_query, predicate)?;
        self.record(results.is_empty());
        Ok(results)
    }

    pub fn no_result_requests(&self) -> usize {
        self.empty_requests
    }

    /// Requests currently in the window.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    fn record(&mut self, is_empty: bool) {
        self.current_time += 1;
        while let Some(front) = self.requests.front() {
            if self.current_time - front.time < REQUEST_WINDOW as u64 {
                break;
            }
            if front.is_empty {
                self.empty_requests -= 1;
            }
            self.requests.pop_front();
        }
        self.requests.push_back(QueryResult { time: self.current_time, is_empty });
        if is_empty {
            self.empty_requests += 1;
        }
    }
}

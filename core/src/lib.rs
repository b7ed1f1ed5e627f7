//! In-memory TF-IDF full-text index with plus/minus term queries,
//! predicate filtering and optional data-parallel execution.
//!
//! ```
//! use sift_core::{DocumentStatus, SearchEngine};
//!
//! let mut engine = SearchEngine::from_stop_text("and in").unwrap();
//! engine.add_document(1, "white cat and fancy collar", DocumentStatus::Actual, &[8, -3]).unwrap();
//! engine.add_document(2, "fluffy cat fluffy tail", DocumentStatus::Actual, &[7, 2, 7]).unwrap();
//!
//! let found = engine.find_top_documents("fluffy cat -collar").unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].id, 2);
//! ```

pub mod concurrent_map;
pub mod corpus;
pub mod document;
pub mod duplicates;
pub mod engine;
pub mod error;
pub mod execution;
pub mod index;
pub mod log_duration;
pub mod paginator;
pub mod process_queries;
pub mod query;
pub mod request_queue;
pub mod scorer;
pub mod terms;
pub mod tokenizer;

pub use concurrent_map::ConcurrentMap;
pub use document::{compute_average_rating, DocId, Document, DocumentStatus};
pub use duplicates::remove_duplicates;
pub use engine::SearchEngine;
pub use error::{Error, Result, WordContext};
pub use execution::{max_workers, ExecutionMode, Predicate};
pub use log_duration::LogDuration;
pub use paginator::{paginate, Page, Paginator};
pub use process_queries::{process_queries, process_queries_joined};
pub use query::{Query, StopWords};
pub use request_queue::{RequestQueue, REQUEST_WINDOW};
pub use scorer::{MAX_RESULT_DOCUMENT_COUNT, RELEVANCE_EPSILON};
pub use terms::TermId;

//! The contract every search backend implements.
//!
//! Three implementations ship with the crate:
//!
//! - [`MemorySearchEngine`](crate::memory::MemorySearchEngine): an in-process
//!   index with the same query semantics as the remote engine.
//! - [`RemoteSearchEngine`](crate::remote::RemoteSearchEngine): routes
//!   documents to several indexes of an HTTP document store.
//! - [`LoggingSearchEngine`](crate::logging::LoggingSearchEngine): wraps
//!   another backend and logs its traffic.
//!
//! All calls are synchronous. Implementations are shared between threads
//! behind an `Arc<dyn SearchEngine>`.

use std::fmt::Debug;

use crate::data::InputDocument;
use crate::error::Result;
use crate::query::SearchQuery;
use crate::response::SearchResponse;

/// A search backend.
pub trait SearchEngine: Send + Sync + Debug {
    /// Prepare the backend for use.
    fn startup(&self) -> Result<()>;

    /// Release any resources held by the backend.
    fn shutdown(&self) -> Result<()>;

    /// Check that the backend is reachable; returns an error if it is not.
    fn ping(&self) -> Result<()>;

    /// Create an empty document for this backend.
    fn create_input_document(&self) -> InputDocument {
        InputDocument::new()
    }

    fn create_query(&self) -> SearchQuery {
        SearchQuery::default()
    }

    fn create_query_with_text(&self, query_text: &str) -> SearchQuery {
        SearchQuery::new(query_text)
    }

    /// Add or replace documents, keyed by their `DocId`.
    ///
    /// Documents are processed independently; failures are reported together
    /// after the whole batch has been attempted.
    fn add(&self, docs: Vec<InputDocument>) -> Result<()>;

    /// Make previous changes visible. `wait` blocks until pending work finishes.
    fn commit(&self, wait: bool) -> Result<()>;

    /// Delete documents by id. Unknown ids are not an error.
    fn delete_by_id(&self, ids: &[&str]) -> Result<()>;

    /// Delete every document matching the query text.
    fn delete_by_query(&self, query_text: &str) -> Result<()>;

    fn query(&self, query: &SearchQuery) -> Result<SearchResponse>;

    fn document_count(&self) -> Result<usize>;
}

//! In-memory search engine.
//!
//! Keeps every document in one collection guarded by a read-write lock and
//! evaluates queries by scanning it. Query semantics follow the remote engine
//! for the supported subset (single terms, filters, facets, sorting, paging).
//! Nothing is persisted.
//!
//! # Example
//!
//! ```
//! use searchplex::{InputDocument, MemorySearchEngine, SearchEngine, SearchQuery};
//!
//! let engine = MemorySearchEngine::new();
//! engine.add(vec![InputDocument::with_id("u1").field("name", "Alice")]).unwrap();
//!
//! let response = engine.query(&SearchQuery::new("name:alice")).unwrap();
//! assert_eq!(response.num_found, 1);
//! ```

pub mod document;
pub mod index;

use log::debug;
use parking_lot::RwLock;

use crate::data::InputDocument;
use crate::engine::SearchEngine;
use crate::error::{ItemFailure, Result, SearchError};
use crate::query::{QueryParser, SearchQuery};
use crate::response::SearchResponse;

pub use document::{IndexedDocument, IndexedField};
pub use index::MemoryIndex;

/// A [`SearchEngine`] holding its documents in process memory.
///
/// A query observes either the state before or after any single `add`,
/// `delete_by_id` or `delete_by_query` call, never a partial one.
#[derive(Debug, Default)]
pub struct MemorySearchEngine {
    index: RwLock<MemoryIndex>,
}

impl MemorySearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine that parses queries with the given parser.
    pub fn with_parser(parser: QueryParser) -> Self {
        Self {
            index: RwLock::new(MemoryIndex::with_parser(parser)),
        }
    }

    pub fn size(&self) -> usize {
        self.index.read().size()
    }
}

impl SearchEngine for MemorySearchEngine {
    fn startup(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn add(&self, docs: Vec<InputDocument>) -> Result<()> {
        let total = docs.len();
        let mut failures = Vec::new();

        let mut index = self.index.write();
        for (position, doc) in docs.iter().enumerate() {
            if let Err(e) = index.add(doc) {
                failures.push(ItemFailure {
                    item: format!("document #{position}"),
                    error: e,
                });
            }
        }
        debug!("Added {} of {total} documents", total - failures.len());

        SearchError::check_batch("add documents", total, failures)
    }

    fn commit(&self, _wait: bool) -> Result<()> {
        Ok(())
    }

    fn delete_by_id(&self, ids: &[&str]) -> Result<()> {
        let mut index = self.index.write();
        for id in ids {
            index.delete_by_id(id);
        }
        Ok(())
    }

    fn delete_by_query(&self, query_text: &str) -> Result<()> {
        let deleted = self.index.write().delete_by_query(query_text);
        debug!("Deleted {deleted} documents matching '{query_text}'");
        Ok(())
    }

    fn query(&self, query: &SearchQuery) -> Result<SearchResponse> {
        Ok(self.index.read().process_query(query))
    }

    fn document_count(&self) -> Result<usize> {
        Ok(self.size())
    }
}

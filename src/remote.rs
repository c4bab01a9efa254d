//! Search engine backed by several indexes of a remote HTTP document store.
//!
//! Documents are split by index (see [`router`]), marshalled to JSON (see
//! [`marshal`]) and written with one request per index. There is no
//! transaction spanning indexes: when a write fails on one index the others
//! keep what they received, and the failure is reported so the caller can
//! retry the document.
//!
//! Wire protocol, relative to `{base_url}/{index}`:
//!
//! | operation        | request                                        |
//! |------------------|------------------------------------------------|
//! | upsert           | `PUT _doc/{url-encoded id}`                    |
//! | delete           | `DELETE _doc/{url-encoded id}` (404 is fine)   |
//! | count            | `GET _doc/_count`                              |
//! | flush            | `GET _flush[?wait_for_ongoing]`                |
//! | delete by query  | `POST _delete_by_query`                        |
//! | search           | `POST _search`                                 |

pub mod config;
pub mod marshal;
pub mod router;
pub mod transport;
pub mod translate;

use std::sync::Arc;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::data::InputDocument;
use crate::engine::SearchEngine;
use crate::error::{ItemFailure, Result, SearchError};
use crate::query::SearchQuery;
use crate::response::SearchResponse;

pub use config::{IndexRegistry, RemoteConfig};
pub use marshal::DocumentMarshaller;
pub use router::DocumentRouter;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use translate::QueryTranslator;

/// Body of a `_count` response.
#[derive(Debug, Deserialize)]
struct CountResponse {
    count: usize,
}

/// A [`SearchEngine`] writing to a default index and any number of secondary
/// indexes.
#[derive(Debug)]
pub struct RemoteSearchEngine {
    registry: IndexRegistry,
    transport: Arc<dyn HttpTransport>,
    marshaller: DocumentMarshaller,
    translator: QueryTranslator,
}

impl RemoteSearchEngine {
    /// Create an engine talking HTTP through `reqwest`.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let transport = ReqwestTransport::from_config(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create an engine with a custom transport.
    pub fn with_transport(config: RemoteConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        Ok(Self {
            registry: IndexRegistry::new(&config)?,
            transport,
            marshaller: DocumentMarshaller::new(),
            translator: QueryTranslator::new(),
        })
    }

    pub fn registry(&self) -> &IndexRegistry {
        &self.registry
    }

    fn doc_url(&self, index: &str, id: &str) -> String {
        format!(
            "{}/_doc/{}",
            self.registry.index_url(index),
            urlencoding::encode(id)
        )
    }

    /// Number of documents in one index.
    pub fn count_index(&self, index: &str) -> Result<usize> {
        let url = format!("{}/_doc/_count", self.registry.index_url(index));
        let response = self.transport.get(&url)?.error_for_status()?;
        let count: CountResponse = serde_json::from_str(&response.body)?;
        Ok(count.count)
    }

    /// Split and marshal one document, then write every part.
    ///
    /// Nothing is written unless the whole document can be routed and
    /// marshalled.
    fn add_document(&self, doc: &InputDocument) -> Result<()> {
        let parts = DocumentRouter::new(&self.registry).split(doc)?;
        let id = doc.doc_id().map_err(|e| SearchError::routing(e.to_string()))?;

        let mut bodies = Vec::with_capacity(parts.len());
        for (index, part) in &parts {
            let body = self
                .marshaller
                .to_json(part)
                .map_err(|e| e.context(format!("marshal document '{id}' for index '{index}'")))?;
            bodies.push((index, body));
        }

        for (index, body) in bodies {
            self.transport
                .put_json(&self.doc_url(index, &id), &body)
                .and_then(HttpResponse::error_for_status)
                .map_err(|e| e.context(format!("add document '{id}' to index '{index}'")))?;
        }
        Ok(())
    }

    fn delete_one(&self, index: &str, id: &str) -> Result<()> {
        let response = self.transport.delete(&self.doc_url(index, id))?;
        if response.is_not_found() {
            debug!("Document '{id}' not found in index '{index}'");
            return Ok(());
        }
        response.error_for_status().map(|_| ())
    }

    fn flush_one(&self, index: &str, wait: bool) -> Result<()> {
        let mut url = format!("{}/_flush", self.registry.index_url(index));
        if wait {
            url.push_str("?wait_for_ongoing");
        }
        self.transport.get(&url)?.error_for_status().map(|_| ())
    }
}

impl SearchEngine for RemoteSearchEngine {
    fn startup(&self) -> Result<()> {
        info!(
            "Remote search engine at {} with indexes {:?} (default '{}')",
            self.registry.base_url(),
            self.registry.all_indexes(),
            self.registry.default_index()
        );
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    /// Ask every index for its document count.
    fn ping(&self) -> Result<()> {
        for index in self.registry.all_indexes() {
            self.count_index(index)
                .map_err(|e| e.context(format!("ping index '{index}'")))?;
        }
        Ok(())
    }

    fn create_input_document(&self) -> InputDocument {
        self.registry.create_input_document()
    }

    fn add(&self, docs: Vec<InputDocument>) -> Result<()> {
        let total = docs.len();
        let mut failures = Vec::new();

        for (position, doc) in docs.iter().enumerate() {
            if let Err(e) = self.add_document(doc) {
                let item = doc
                    .doc_id()
                    .unwrap_or_else(|_| format!("document #{position}"));
                warn!("Failed to add {item}: {e}");
                failures.push(ItemFailure { item, error: e });
            }
        }

        SearchError::check_batch("add documents", total, failures)
    }

    fn commit(&self, wait: bool) -> Result<()> {
        let indexes = self.registry.all_indexes();
        let mut failures = Vec::new();

        for index in &indexes {
            if let Err(e) = self.flush_one(index, wait) {
                failures.push(ItemFailure {
                    item: index.to_string(),
                    error: e,
                });
            }
        }

        SearchError::check_batch("flush indexes", indexes.len(), failures)
    }

    fn delete_by_id(&self, ids: &[&str]) -> Result<()> {
        let indexes = self.registry.all_indexes();
        let mut failures = Vec::new();

        for id in ids {
            for index in &indexes {
                if let Err(e) = self.delete_one(index, id) {
                    failures.push(ItemFailure {
                        item: format!("{id}@{index}"),
                        error: e,
                    });
                }
            }
        }

        SearchError::check_batch("delete documents", ids.len() * indexes.len(), failures)
    }

    /// Best effort: an index answering with an error status is logged and
    /// skipped. A transport failure stops the operation.
    fn delete_by_query(&self, query_text: &str) -> Result<()> {
        let body = serde_json::to_string(&self.translator.delete_by_query_body(query_text))?;

        for index in self.registry.all_indexes() {
            let url = format!("{}/_delete_by_query", self.registry.index_url(index));
            let response = self.transport.post_json(&url, &body).map_err(|e| {
                e.context(format!("delete by query '{query_text}' on index '{index}'"))
            })?;
            if response.is_error() {
                warn!(
                    "Failed to delete by query '{query_text}' on index '{index}': {} {} {}",
                    response.status, response.reason, response.body
                );
            }
        }
        Ok(())
    }

    fn query(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let url = format!("{}/_search", self.registry.default_index_url());
        let body = serde_json::to_string(&self.translator.search_body(query))?;

        let response = self
            .transport
            .post_json(&url, &body)
            .and_then(HttpResponse::error_for_status)
            .map_err(|e| e.context(format!("search index '{}'", self.registry.default_index())))?;
        self.translator.parse_search_response(&response.body, query)
    }

    /// Counts the default index only.
    fn document_count(&self) -> Result<usize> {
        self.count_index(self.registry.default_index())
            .map_err(|e| e.context("count documents"))
    }
}

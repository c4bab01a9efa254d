//! A search engine decorator that logs queries and responses.
//!
//! Every call is forwarded unchanged to the wrapped engine; results and
//! errors pass through untouched.

use std::fmt::Display;
use std::sync::Arc;

use log::info;

use crate::data::InputDocument;
use crate::engine::SearchEngine;
use crate::error::Result;
use crate::query::{
    DEFAULT_FACET_LIMIT, DEFAULT_FACET_MIN_COUNT, QueryParser, SearchQuery, escape_query_text,
};
use crate::response::SearchResponse;

/// Field whose values identify a result by name in response summaries.
pub const DEFAULT_NAME_FIELD: &str = "nameRaw";

/// Wraps another [`SearchEngine`] and logs its query traffic at info level.
#[derive(Debug, Clone)]
pub struct LoggingSearchEngine {
    inner: Arc<dyn SearchEngine>,
    name_field: String,
    parser: QueryParser,
}

impl LoggingSearchEngine {
    pub fn new(inner: Arc<dyn SearchEngine>) -> Self {
        Self {
            inner,
            name_field: DEFAULT_NAME_FIELD.to_string(),
            parser: QueryParser::new(),
        }
    }

    pub fn with_name_field(mut self, name_field: impl Into<String>) -> Self {
        self.name_field = name_field.into();
        self
    }

    pub fn inner(&self) -> &Arc<dyn SearchEngine> {
        &self.inner
    }

    fn log_parsed_query(&self, query: &SearchQuery) {
        info!("Parsing: {}", format_query(query));
        match self.parser.parse_escaped(&escape_query_text(&query.query_text)) {
            Ok(Some(node)) => info!("Parsed: {node}"),
            Ok(None) => info!("Parsed: not implemented"),
            Err(e) => info!("Failed to parse query: {e}"),
        }
    }
}

/// A compact description of a query listing only the values that differ from
/// the defaults, e.g. `SearchQuery[queryText=alice, rows=10]`.
pub fn format_query(query: &SearchQuery) -> String {
    let mut terms = Vec::new();
    if !query.query_text.trim().is_empty() {
        terms.push(format!("queryText={}", query.query_text));
    }
    if query.start != 0 {
        terms.push(format!("start={}", query.start));
    }
    if query.rows != 0 {
        terms.push(format!("rows={}", query.rows));
    }
    if !query.fields_to_return.is_empty() {
        terms.push(format!("fieldsToReturn={}", list(&query.fields_to_return)));
    }
    if !query.sort_fields.is_empty() {
        let sorts: Vec<String> = query
            .sort_fields
            .iter()
            .map(|s| format!("{} {}", s.field, s.order.as_str()))
            .collect();
        terms.push(format!("sortFields={}", list(&sorts)));
    }
    if !query.filters.is_empty() {
        terms.push(format!("filters={}", list(&query.filters)));
    }
    if !query.facet_fields.is_empty() {
        terms.push(format!("facetFields={}", list(&query.facet_fields)));
    }
    if query.facet_limit != DEFAULT_FACET_LIMIT {
        terms.push(format!("facetLimit={}", query.facet_limit));
    }
    if query.facet_min_count != DEFAULT_FACET_MIN_COUNT {
        terms.push(format!("facetMinCount={}", query.facet_min_count));
    }
    format!("SearchQuery{}", list(&terms))
}

/// `RESPONSE: <returned> of <found>, [[id, [names]], ...]`.
pub fn summarize_response(response: &SearchResponse, name_field: &str) -> String {
    let summaries: Vec<String> = response
        .results
        .iter()
        .map(|doc| format!("[{}, {}]", doc.unique_id, list(doc.field_values(name_field))))
        .collect();
    format!(
        "RESPONSE: {} of {}, {}",
        response.len(),
        response.num_found,
        list(&summaries)
    )
}

fn list<T: Display>(items: &[T]) -> String {
    let items: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

impl SearchEngine for LoggingSearchEngine {
    fn startup(&self) -> Result<()> {
        self.inner.startup()
    }

    fn shutdown(&self) -> Result<()> {
        self.inner.shutdown()
    }

    fn ping(&self) -> Result<()> {
        self.inner.ping()
    }

    fn create_input_document(&self) -> InputDocument {
        self.inner.create_input_document()
    }

    fn create_query(&self) -> SearchQuery {
        self.inner.create_query()
    }

    fn create_query_with_text(&self, query_text: &str) -> SearchQuery {
        self.inner.create_query_with_text(query_text)
    }

    fn add(&self, docs: Vec<InputDocument>) -> Result<()> {
        self.inner.add(docs)
    }

    fn commit(&self, wait: bool) -> Result<()> {
        self.inner.commit(wait)
    }

    fn delete_by_id(&self, ids: &[&str]) -> Result<()> {
        self.inner.delete_by_id(ids)
    }

    fn delete_by_query(&self, query_text: &str) -> Result<()> {
        info!("deleteByQuery: {query_text}");
        self.inner.delete_by_query(query_text)
    }

    fn query(&self, query: &SearchQuery) -> Result<SearchResponse> {
        self.log_parsed_query(query);
        let response = self.inner.query(query)?;
        info!("{}", summarize_response(&response, &self.name_field));
        Ok(response)
    }

    fn document_count(&self) -> Result<usize> {
        self.inner.document_count()
    }
}

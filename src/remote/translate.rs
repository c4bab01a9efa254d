//! Translation of queries into the remote store's JSON request bodies, and of
//! its search responses back into [`SearchResponse`].

use std::collections::HashMap;

use serde_json::{Map, Value, json};

use crate::error::{Result, SearchError};
use crate::query::{ALL_TEXT_FIELD, SearchQuery, escape_query_text};
use crate::remote::marshal::DocumentMarshaller;
use crate::response::{FacetCount, FacetField, Highlights, ResultDocument, SearchResponse};

/// Builds `_search` and `_delete_by_query` bodies.
#[derive(Debug, Clone)]
pub struct QueryTranslator {
    default_field: String,
}

impl Default for QueryTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryTranslator {
    pub fn new() -> Self {
        Self {
            default_field: ALL_TEXT_FIELD.to_string(),
        }
    }

    pub fn with_default_field(mut self, field: impl Into<String>) -> Self {
        self.default_field = field.into();
        self
    }

    /// A `query_string` clause for one query text. Blank text matches nothing.
    pub fn query_clause(&self, text: &str) -> Value {
        if text.trim().is_empty() {
            return json!({ "match_none": {} });
        }
        json!({
            "query_string": {
                "query": escape_query_text(text),
                "default_field": self.default_field,
            }
        })
    }

    /// The body of a `_search` request.
    pub fn search_body(&self, query: &SearchQuery) -> Value {
        let filters: Vec<Value> = query.filters.iter().map(|f| self.query_clause(f)).collect();

        let mut body = Map::new();
        body.insert(
            "query".to_string(),
            json!({
                "bool": {
                    "must": self.query_clause(&query.query_text),
                    "filter": filters,
                }
            }),
        );
        body.insert("from".to_string(), json!(query.start));
        if query.rows > 0 {
            body.insert("size".to_string(), json!(query.rows));
        }
        if !query.fields_to_return.is_empty() {
            body.insert("_source".to_string(), json!(query.fields_to_return));
        }
        if !query.sort_fields.is_empty() {
            let sort: Vec<Value> = query
                .sort_fields
                .iter()
                .map(|s| {
                    let mut clause = Map::new();
                    clause.insert(s.field.clone(), json!({ "order": s.order.as_str() }));
                    Value::Object(clause)
                })
                .collect();
            body.insert("sort".to_string(), Value::Array(sort));
        }
        if !query.facet_fields.is_empty() {
            let aggs: Map<String, Value> = query
                .facet_fields
                .iter()
                .map(|field| {
                    let agg = json!({
                        "terms": {
                            "field": field,
                            "size": query.facet_limit,
                            "min_doc_count": query.facet_min_count.max(1),
                        }
                    });
                    (field.clone(), agg)
                })
                .collect();
            body.insert("aggs".to_string(), Value::Object(aggs));
        }
        Value::Object(body)
    }

    /// The body of a `_delete_by_query` request.
    pub fn delete_by_query_body(&self, query_text: &str) -> Value {
        json!({ "query": self.query_clause(query_text) })
    }

    /// Read a `_search` response body.
    pub fn parse_search_response(&self, body: &str, query: &SearchQuery) -> Result<SearchResponse> {
        let json: Value = serde_json::from_str(body)?;
        let hits = json
            .get("hits")
            .ok_or_else(|| SearchError::marshal("search response has no 'hits'"))?;

        let num_found = match hits.get("total") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(total) => total.get("value").and_then(Value::as_u64),
            None => None,
        }
        .unwrap_or(0) as usize;

        let marshaller = DocumentMarshaller::new();
        let mut results = Vec::new();
        let mut highlights: Option<Highlights> = None;

        for hit in hits.get("hits").and_then(Value::as_array).into_iter().flatten() {
            let id = hit
                .get("_id")
                .and_then(Value::as_str)
                .ok_or_else(|| SearchError::marshal("search hit has no '_id'"))?;

            let mut result = ResultDocument::new(id);
            if let Some(source) = hit.get("_source") {
                let doc = marshaller.unmarshal(source)?;
                for field in doc.fields() {
                    result
                        .fields
                        .insert(field.name().to_string(), field.flattened_values());
                }
            }
            results.push(result);

            if let Some(highlight) = hit.get("highlight").and_then(Value::as_object) {
                let snippets: HashMap<String, Vec<String>> = highlight
                    .iter()
                    .map(|(field, values)| (field.clone(), strings(values)))
                    .collect();
                highlights
                    .get_or_insert_with(HashMap::new)
                    .insert(id.to_string(), snippets);
            }
        }

        let aggregations = json.get("aggregations");
        let facets = query
            .facet_fields
            .iter()
            .map(|field| {
                let buckets = aggregations
                    .and_then(|aggs| aggs.get(field))
                    .and_then(|agg| agg.get("buckets"))
                    .and_then(Value::as_array);
                let values = buckets
                    .into_iter()
                    .flatten()
                    .filter_map(|bucket| {
                        let value = match bucket.get("key")? {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        let count = bucket.get("doc_count")?.as_u64()? as usize;
                        Some(FacetCount { value, count })
                    })
                    .collect();
                (
                    field.clone(),
                    FacetField {
                        name: field.clone(),
                        values,
                    },
                )
            })
            .collect();

        Ok(SearchResponse {
            results,
            num_found,
            facets,
            highlights,
        })
    }
}

fn strings(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        Value::String(s) => vec![s.clone()],
        _ => Vec::new(),
    }
}

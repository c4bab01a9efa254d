//! Search results returned by every backend.

use std::collections::{BTreeMap, HashMap};

use crate::data::FieldValue;

/// Highlight snippets: document id -> field -> snippets.
pub type Highlights = HashMap<String, HashMap<String, Vec<String>>>;

/// A document in a search response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultDocument {
    /// The document's `DocId`.
    pub unique_id: String,
    /// Field values, flattened, keyed by field name.
    pub fields: BTreeMap<String, Vec<FieldValue>>,
}

impl ResultDocument {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn field_values(&self, name: &str) -> &[FieldValue] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first_value(&self, name: &str) -> Option<&FieldValue> {
        self.field_values(name).first()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn add_value(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.entry(name.into()).or_default().push(value.into());
    }
}

/// Number of matching documents for one value of a facet field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetCount {
    pub value: String,
    pub count: usize,
}

/// Facet counts for one field, most frequent value first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FacetField {
    pub name: String,
    pub values: Vec<FacetCount>,
}

impl FacetField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// The count reported for `value`, if it was reported at all.
    pub fn count_of(&self, value: &str) -> Option<usize> {
        self.values.iter().find(|v| v.value == value).map(|v| v.count)
    }
}

/// The result of a query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResponse {
    /// The requested page of matching documents.
    pub results: Vec<ResultDocument>,

    /// Total number of matching documents, ignoring pagination.
    pub num_found: usize,

    /// Facet counts keyed by field name.
    pub facets: BTreeMap<String, FacetField>,

    /// `None` when the backend does not compute highlights.
    pub highlights: Option<Highlights>,
}

impl SearchResponse {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn facet_field(&self, name: &str) -> Option<&FacetField> {
        self.facets.get(name)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.unique_id.as_str()).collect()
    }
}

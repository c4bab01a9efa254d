//! Documents as stored by the in-memory index.

use std::collections::BTreeMap;

use crate::data::{FieldValue, InputDocument, InputField};
use crate::error::Result;
use crate::query::TermSource;
use crate::response::ResultDocument;

/// A field prepared for matching, faceting and sorting.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedField {
    /// Values with collections flattened one level.
    values: Vec<FieldValue>,
    /// Lower-cased whitespace-separated tokens of every value.
    terms: Vec<String>,
    /// Every value followed by a space, concatenated.
    sort_value: String,
}

impl IndexedField {
    pub fn from_input(field: &InputField) -> Self {
        let values = field.flattened_values();
        let mut terms = Vec::new();
        let mut sort_value = String::new();

        for value in &values {
            let raw = value.to_string();
            terms.extend(raw.to_lowercase().split_whitespace().map(str::to_string));
            sort_value.push_str(&raw);
            sort_value.push(' ');
        }

        Self {
            values,
            terms,
            sort_value,
        }
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn sort_value(&self) -> &str {
        &self.sort_value
    }

    fn has_term(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }
}

/// An owned copy of an input document, keyed by its id.
///
/// Nothing is shared with the input document, so callers may keep mutating
/// theirs after it was added.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument {
    id: String,
    fields: BTreeMap<String, IndexedField>,
}

impl IndexedDocument {
    /// Index a document. Fails if it lacks a single-valued `DocId`.
    pub fn from_input(doc: &InputDocument) -> Result<Self> {
        let id = doc.doc_id()?;
        let fields = doc
            .fields()
            .map(|field| (field.name().to_string(), IndexedField::from_input(field)))
            .collect();
        Ok(Self { id, fields })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn field(&self, name: &str) -> Option<&IndexedField> {
        self.fields.get(name)
    }

    /// The sort key of a field; empty for a missing field.
    pub fn sort_value(&self, name: &str) -> &str {
        self.field(name).map(IndexedField::sort_value).unwrap_or("")
    }

    /// Convert to a result document, keeping only `fields_to_return` unless it
    /// is empty.
    pub fn to_result(&self, fields_to_return: &[String]) -> ResultDocument {
        let mut result = ResultDocument::new(self.id.clone());
        for (name, field) in &self.fields {
            if fields_to_return.is_empty() || fields_to_return.contains(name) {
                result.fields.insert(name.clone(), field.values.clone());
            }
        }
        result
    }
}

impl TermSource for IndexedDocument {
    fn has_term(&self, field: &str, term: &str) -> bool {
        self.fields.get(field).is_some_and(|f| f.has_term(term))
    }

    fn has_term_in_any_field(&self, term: &str) -> bool {
        self.fields.values().any(|f| f.has_term(term))
    }
}

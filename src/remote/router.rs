//! Splits a document into one document per target index.
//!
//! A field named `name` belongs to the default index; `index:name` belongs to
//! `index` and is stored there as `name`. Every produced document carries the
//! input's `DocId`.

use std::collections::BTreeMap;

use crate::data::{DOC_ID_FIELD, InputDocument, InputField};
use crate::error::{Result, SearchError};
use crate::remote::config::IndexRegistry;

/// Routes fields to the indexes of a registry.
#[derive(Debug, Clone, Copy)]
pub struct DocumentRouter<'a> {
    registry: &'a IndexRegistry,
}

impl<'a> DocumentRouter<'a> {
    pub fn new(registry: &'a IndexRegistry) -> Self {
        Self { registry }
    }

    /// Split a document by target index.
    ///
    /// The produced documents and fields are new values; nothing is shared
    /// with the input. The whole document is rejected if any field cannot be
    /// routed.
    pub fn split(&self, doc: &InputDocument) -> Result<BTreeMap<String, InputDocument>> {
        let id_field = doc.get_field(DOC_ID_FIELD).ok_or_else(|| {
            SearchError::routing(format!("document has no '{DOC_ID_FIELD}' field"))
        })?;

        let mut parts: BTreeMap<String, InputDocument> = BTreeMap::new();
        for field in doc.fields() {
            let (index, name) = self.resolve(field.name())?;
            let part = parts.entry(index.to_string()).or_insert_with(|| {
                let mut part = self.registry.create_input_document();
                part.add_field(id_field.clone());
                part
            });
            part.add_field(InputField::with_values(name, field.values().iter().cloned()));
        }
        Ok(parts)
    }

    /// The index and unqualified name for a field name.
    pub fn resolve<'n>(&self, field_name: &'n str) -> Result<(&'a str, &'n str)> {
        let parts: Vec<&str> = field_name.split(':').collect();
        let (index, name) = match parts.as_slice() {
            [name] => (self.registry.default_index(), *name),
            [index, name] => (*index, *name),
            _ => {
                return Err(SearchError::routing(format!(
                    "The field name '{field_name}' is invalid. Too many colons."
                )));
            }
        };

        if name.is_empty() {
            return Err(SearchError::routing(format!(
                "The field name '{field_name}' has an empty name"
            )));
        }

        self.registry
            .all_indexes()
            .into_iter()
            .find(|registered| *registered == index)
            .map(|registered| (registered, name))
            .ok_or_else(|| {
                SearchError::routing(format!(
                    "The index '{index}' is not configured: field name is '{field_name}'"
                ))
            })
    }
}

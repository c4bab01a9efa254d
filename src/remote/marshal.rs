//! Conversion between documents and their JSON form in the remote store.
//!
//! Every field becomes a list of values. A dotted field name becomes a path of
//! nested objects, each wrapped in a one-element list, so `a.b` and `a.c`
//! produce `{"a": [{"b": [..], "c": [..]}]}`. Object keys are written in
//! sorted order.

use std::collections::BTreeMap;

use log::debug;
use serde_json::{Map, Number, Value};

use crate::data::{FieldValue, InputDocument};
use crate::error::{Result, SearchError};

/// Converts documents to and from JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentMarshaller;

/// A node of the nested field tree.
enum Node {
    Leaf(Vec<Value>),
    Branch(BTreeMap<String, Node>),
}

impl DocumentMarshaller {
    pub fn new() -> Self {
        Self
    }

    pub fn to_value(&self, doc: &InputDocument) -> Result<Value> {
        let mut root: BTreeMap<String, Node> = BTreeMap::new();

        for field in doc.fields() {
            let values = field
                .flattened_values()
                .iter()
                .map(|value| to_json_value(field.name(), value))
                .collect::<Result<Vec<_>>>()?;
            store(&mut root, field.name(), values)?;
        }

        Ok(branch_to_value(root))
    }

    pub fn to_json(&self, doc: &InputDocument) -> Result<String> {
        let json = serde_json::to_string(&self.to_value(doc)?)?;
        debug!("Converted document {doc:?} to json '{json}'");
        Ok(json)
    }

    pub fn to_json_pretty(&self, doc: &InputDocument) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value(doc)?)?)
    }

    /// Rebuild a document from its JSON form, joining nested names with `.`.
    ///
    /// A bare scalar is read as a single value.
    pub fn unmarshal(&self, value: &Value) -> Result<InputDocument> {
        let object = value
            .as_object()
            .ok_or_else(|| SearchError::marshal(format!("expected a JSON object, got {value}")))?;

        let mut doc = InputDocument::new();
        collect_fields(&mut doc, "", object)?;
        Ok(doc)
    }
}

/// Insert `values` at the dotted path `name`.
fn store(target: &mut BTreeMap<String, Node>, name: &str, values: Vec<Value>) -> Result<()> {
    let mut node = target;
    let mut segments = name.split('.').peekable();

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            if matches!(node.get(segment), Some(Node::Branch(_))) {
                return Err(conflict(name));
            }
            node.insert(segment.to_string(), Node::Leaf(values));
            return Ok(());
        }

        let child = node
            .entry(segment.to_string())
            .or_insert_with(|| Node::Branch(BTreeMap::new()));
        node = match child {
            Node::Branch(children) => children,
            Node::Leaf(_) => return Err(conflict(name)),
        };
    }
    Ok(())
}

fn conflict(name: &str) -> SearchError {
    SearchError::marshal(format!(
        "field '{name}' conflicts with another field on the same path"
    ))
}

fn branch_to_value(children: BTreeMap<String, Node>) -> Value {
    let object: Map<String, Value> = children
        .into_iter()
        .map(|(key, node)| {
            let value = match node {
                Node::Leaf(values) => Value::Array(values),
                Node::Branch(grandchildren) => Value::Array(vec![branch_to_value(grandchildren)]),
            };
            (key, value)
        })
        .collect();
    Value::Object(object)
}

fn to_json_value(field: &str, value: &FieldValue) -> Result<Value> {
    Ok(match value {
        FieldValue::Null => Value::Null,
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Int(i) => Value::Number((*i).into()),
        FieldValue::Float(f) => Value::Number(Number::from_f64(*f).ok_or_else(|| {
            SearchError::marshal(format!("field '{field}': {f} cannot be represented in JSON"))
        })?),
        FieldValue::Text(s) => Value::String(s.clone()),
        FieldValue::Bytes(_) => {
            return Err(SearchError::marshal(format!(
                "field '{field}': binary values are not supported"
            )));
        }
        FieldValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| to_json_value(field, item))
                .collect::<Result<Vec<_>>>()?,
        ),
    })
}

fn collect_fields(doc: &mut InputDocument, prefix: &str, object: &Map<String, Value>) -> Result<()> {
    for (key, value) in object {
        let name = format!("{prefix}{key}");
        match value {
            Value::Array(items) if items.first().is_some_and(Value::is_object) => {
                for item in items {
                    let nested = item.as_object().ok_or_else(|| {
                        SearchError::marshal(format!("field '{name}' mixes objects and values"))
                    })?;
                    collect_fields(doc, &format!("{name}."), nested)?;
                }
            }
            Value::Array(items) => {
                let values = items.iter().map(|item| from_json_value(&name, item)).collect::<Result<Vec<_>>>()?;
                doc.add_values(&name, values);
            }
            Value::Object(nested) => collect_fields(doc, &format!("{name}."), nested)?,
            scalar => doc.add_values(&name, [from_json_value(&name, scalar)?]),
        }
    }
    Ok(())
}

fn from_json_value(field: &str, value: &Value) -> Result<FieldValue> {
    Ok(match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => FieldValue::Int(i),
            None => FieldValue::Float(n.as_f64().ok_or_else(|| {
                SearchError::marshal(format!("field '{field}': unsupported number {n}"))
            })?),
        },
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Array(items) => FieldValue::List(
            items
                .iter()
                .map(|item| from_json_value(field, item))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Object(_) => {
            return Err(SearchError::marshal(format!(
                "field '{field}': objects are not allowed among values"
            )));
        }
    })
}

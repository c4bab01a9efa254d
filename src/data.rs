use std::fmt;

use crate::error::{Result, SearchError};

/// Name of the field every document must carry, holding its unique id.
pub const DOC_ID_FIELD: &str = "DocId";

/// The value type for fields in an input document.
///
/// A value is either a scalar or a collection. Collections are flattened one
/// level when a document is written to a backend: each member becomes a
/// separate value of the field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),

    /// Text content, tokenized for matching.
    Text(String),

    /// Binary content. Kept for callers that carry it around, but no backend
    /// can index or marshal it.
    Bytes(Vec<u8>),

    /// A collection of values (e.g. tags).
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Returns the text value if this is a Text variant.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FieldValue::List(_))
    }
}

/// The raw string form of a value, as used for terms, facets and sorting.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(i) => write!(f, "{i}"),
            // Whole floats keep their ".0", as they do in JSON.
            FieldValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            FieldValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// --- Conversions ---

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(v: Vec<T>) -> Self {
        FieldValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// Flatten collection values one level: members of a `List` become separate
/// values, lists nested deeper are kept as they are.
pub fn flatten_values(values: &[FieldValue]) -> Vec<FieldValue> {
    let mut flat = Vec::with_capacity(values.len());
    for value in values {
        match value {
            FieldValue::List(items) => flat.extend(items.iter().cloned()),
            other => flat.push(other.clone()),
        }
    }
    flat
}

/// A named field of an input document with an ordered list of values.
#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    name: String,
    values: Vec<FieldValue>,
}

impl InputField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn with_values<V: Into<FieldValue>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let mut field = Self::new(name);
        field.add_values(values);
        field
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn first_value(&self) -> Option<&FieldValue> {
        self.values.first()
    }

    pub fn add_value(&mut self, value: impl Into<FieldValue>) {
        self.values.push(value.into());
    }

    pub fn add_values<V: Into<FieldValue>>(&mut self, values: impl IntoIterator<Item = V>) {
        self.values.extend(values.into_iter().map(Into::into));
    }

    /// The values with collections flattened one level.
    pub fn flattened_values(&self) -> Vec<FieldValue> {
        flatten_values(&self.values)
    }
}

/// A document to be indexed: a mapping from field name to field.
///
/// Field names are unique and keep their insertion order. Every document must
/// carry a single-valued [`DOC_ID_FIELD`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputDocument {
    fields: Vec<InputField>,
}

impl InputDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Create a new document holding only its id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self::new().field(DOC_ID_FIELD, id.into())
    }

    /// Add a single-valued field, builder style.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let mut field = InputField::new(name);
        field.add_value(value);
        self.add_field(field);
        self
    }

    /// Create a field that can later be added to this document.
    pub fn create_field(&self, name: impl Into<String>) -> InputField {
        InputField::new(name)
    }

    /// Add a field, replacing (in place) any field with the same name.
    pub fn add_field(&mut self, field: InputField) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// Append values to the named field, creating it if needed.
    pub fn add_values<V: Into<FieldValue>>(
        &mut self,
        name: &str,
        values: impl IntoIterator<Item = V>,
    ) {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.add_values(values),
            None => self.fields.push(InputField::with_values(name, values)),
        }
    }

    pub fn get_field(&self, name: &str) -> Option<&InputField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn remove_field(&mut self, name: &str) -> Option<InputField> {
        let pos = self.fields.iter().position(|f| f.name == name)?;
        Some(self.fields.remove(pos))
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &InputField> {
        self.fields.iter()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The document id: the single value of the `DocId` field.
    pub fn doc_id(&self) -> Result<String> {
        let field = self.get_field(DOC_ID_FIELD).ok_or_else(|| {
            SearchError::invalid_argument(format!("document has no '{DOC_ID_FIELD}' field"))
        })?;
        match field.flattened_values().as_slice() {
            [value] => Ok(value.to_string()),
            values => Err(SearchError::invalid_argument(format!(
                "'{DOC_ID_FIELD}' must have exactly one value, found {}",
                values.len()
            ))),
        }
    }
}

//! Search query model and the query-string parser.
//!
//! - [`SearchQuery`]: what a caller asks a backend for (text, filters, paging,
//!   sorting, facets).
//! - [`parser`]: turns query text plus filters into a [`QueryNode`] tree.
//! - [`node`]: the query tree and its evaluation against a document.

pub mod node;
pub mod parser;

pub use node::{BooleanClause, Occur, QueryNode, TermQuery, TermSource};
pub use parser::QueryParser;

/// The field searched when a query term carries no field qualifier.
///
/// A term on this field matches any field of a document.
pub const ALL_TEXT_FIELD: &str = "ALLTEXT";

pub const DEFAULT_FACET_LIMIT: usize = 100;
pub const DEFAULT_FACET_MIN_COUNT: usize = 0;

/// Escape a raw query string before handing it to a query grammar.
///
/// Callers routinely submit unescaped URIs such as `field:http://example.org/x`.
/// The colon after `http` would read as a second field qualifier and the
/// slashes as regular-expression delimiters, so `http://` becomes `http\://`
/// and every remaining `/` becomes `\/`.
pub fn escape_query_text(text: &str) -> String {
    text.replace("http://", "http\\://").replace('/', "\\/")
}

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A field to sort results by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub order: SortOrder,
}

/// A search request, independent of the backend that executes it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// The main query text.
    pub query_text: String,

    /// Number of results to skip (for pagination).
    pub start: usize,

    /// Maximum number of results to return. 0 means "not set".
    pub rows: usize,

    /// Fields to include in result documents. Empty means all fields.
    pub fields_to_return: Vec<String>,

    /// Sort criteria, most significant first.
    pub sort_fields: Vec<SortField>,

    /// Additional query strings that every result must match.
    pub filters: Vec<String>,

    /// Fields to compute facet counts for.
    pub facet_fields: Vec<String>,

    /// Maximum number of values reported per facet field.
    pub facet_limit: usize,

    /// Minimum count for a facet value to be reported.
    pub facet_min_count: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query_text: String::new(),
            start: 0,
            rows: 0,
            fields_to_return: Vec::new(),
            sort_fields: Vec::new(),
            filters: Vec::new(),
            facet_fields: Vec::new(),
            facet_limit: DEFAULT_FACET_LIMIT,
            facet_min_count: DEFAULT_FACET_MIN_COUNT,
        }
    }
}

impl SearchQuery {
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
            ..Default::default()
        }
    }

    pub fn with_start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    /// Add a field to return. Adding the same field twice has no effect.
    pub fn add_field_to_return(mut self, field: impl Into<String>) -> Self {
        push_unique(&mut self.fields_to_return, field.into());
        self
    }

    pub fn add_sort_field(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_fields.push(SortField {
            field: field.into(),
            order,
        });
        self
    }

    pub fn add_filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Add a facet field. Adding the same field twice has no effect.
    pub fn add_facet_field(mut self, field: impl Into<String>) -> Self {
        push_unique(&mut self.facet_fields, field.into());
        self
    }

    pub fn with_facet_limit(mut self, limit: usize) -> Self {
        self.facet_limit = limit;
        self
    }

    pub fn with_facet_min_count(mut self, min_count: usize) -> Self {
        self.facet_min_count = min_count;
        self
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

//! Parser for query strings and filters.
//!
//! Query text is escaped (see [`escape_query_text`]) and parsed with a
//! Lucene-style grammar. Only single-term queries are evaluated; anything else
//! becomes [`QueryNode::NotImplemented`], which matches no documents. Parsing
//! never fails from the caller's point of view.
//!
//! # Example
//!
//! ```
//! use searchplex::query::{QueryNode, QueryParser};
//!
//! let parser = QueryParser::new();
//! let node = parser.parse("uri:http://example.org/x", &["type:person".to_string()]);
//! assert!(matches!(node, QueryNode::Boolean(_)));
//! ```

use log::warn;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::error::{Result, SearchError};
use crate::query::node::{BooleanClause, QueryNode};
use crate::query::{ALL_TEXT_FIELD, SearchQuery, escape_query_text};

/// Pest grammar parser for the query syntax.
#[derive(Parser)]
#[grammar = "query/query.pest"]
struct QueryGrammar;

/// Converts query text and filters into a [`QueryNode`] tree.
#[derive(Debug, Clone)]
pub struct QueryParser {
    default_field: String,
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryParser {
    /// Create a parser whose unqualified terms search [`ALL_TEXT_FIELD`].
    pub fn new() -> Self {
        Self {
            default_field: ALL_TEXT_FIELD.to_string(),
        }
    }

    pub fn with_default_field(mut self, field: impl Into<String>) -> Self {
        self.default_field = field.into();
        self
    }

    pub fn default_field(&self) -> &str {
        &self.default_field
    }

    /// Parse the main query text and its filters.
    ///
    /// Without filters this is the parsed query text. With filters the result
    /// is a boolean query: the main query as a SHOULD clause, each filter as a
    /// FILTER clause.
    pub fn parse(&self, query_text: &str, filters: &[String]) -> QueryNode {
        let main = self.parse_text(query_text);
        if filters.is_empty() {
            return main;
        }

        let mut clauses = Vec::with_capacity(filters.len() + 1);
        clauses.push(BooleanClause::should(main));
        for filter in filters {
            clauses.push(BooleanClause::filter(self.parse_text(filter)));
        }
        QueryNode::Boolean(clauses)
    }

    /// Parse the text and filters of a [`SearchQuery`].
    pub fn parse_query(&self, query: &SearchQuery) -> QueryNode {
        self.parse(&query.query_text, &query.filters)
    }

    /// Parse a single query string, degrading to `NotImplemented`.
    pub fn parse_text(&self, text: &str) -> QueryNode {
        match self.parse_escaped(&escape_query_text(text)) {
            Ok(Some(node)) => node,
            Ok(None) => {
                warn!("Query not implemented for '{text}'; it will match nothing");
                QueryNode::NotImplemented(text.to_string())
            }
            Err(e) => {
                warn!("Failed to parse query '{text}', using an empty-match query instead: {e}");
                QueryNode::NotImplemented(text.to_string())
            }
        }
    }

    /// Parse an already-escaped query string.
    ///
    /// Returns `Ok(None)` when the syntax is valid but describes something
    /// other than a single term, and a `Parse` error when the syntax is invalid.
    pub fn parse_escaped(&self, escaped: &str) -> Result<Option<QueryNode>> {
        let mut pairs = QueryGrammar::parse(Rule::query, escaped)
            .map_err(|e| SearchError::parse(format!("'{escaped}': {e}")))?;

        let expression = pairs
            .next()
            .and_then(|query| {
                query
                    .into_inner()
                    .find(|pair| pair.as_rule() == Rule::expression)
            })
            .ok_or_else(|| SearchError::parse(format!("'{escaped}': no expression")))?;

        Ok(self.convert_expression(expression, &self.default_field))
    }

    /// An expression is a single term only when it holds exactly one clause.
    fn convert_expression(&self, pair: Pair<Rule>, field: &str) -> Option<QueryNode> {
        let mut elements = pair.into_inner();
        let first = elements.next()?;
        if elements.next().is_some() || first.as_rule() != Rule::clause {
            return None;
        }
        self.convert_clause(first, field)
    }

    fn convert_clause(&self, pair: Pair<Rule>, default_field: &str) -> Option<QueryNode> {
        let mut field = default_field.to_string();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                // +term, -term and !term are boolean queries, not terms.
                Rule::modifier => return None,
                Rule::field => field = unescape(inner.as_str()),
                Rule::group => {
                    let expression = inner.into_inner().next()?;
                    return self.convert_expression(expression, &field);
                }
                Rule::phrase => {
                    let text = inner
                        .into_inner()
                        .next()
                        .map(|p| unescape(p.as_str()))
                        .unwrap_or_default();
                    let mut words = text.split_whitespace();
                    return match (words.next(), words.next()) {
                        (Some(word), None) => Some(QueryNode::term(field, word)),
                        _ => None,
                    };
                }
                Rule::term => return Some(QueryNode::term(field, unescape(inner.as_str()))),
                _ => {}
            }
        }
        None
    }
}

/// Drop the backslash of every escaped character.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

//! Query tree evaluated by the in-memory engine.

use std::fmt;

use crate::query::ALL_TEXT_FIELD;

/// Read access to the lower-cased terms of a document.
///
/// Query evaluation only needs term membership, so the tree is evaluated
/// through this trait instead of a concrete document type.
pub trait TermSource {
    /// Whether `term` (already lower-cased) is among the terms of `field`.
    fn has_term(&self, field: &str, term: &str) -> bool;

    /// Whether `term` (already lower-cased) is among the terms of any field.
    fn has_term_in_any_field(&self, term: &str) -> bool;
}

/// Occurrence requirements for boolean clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// The clause should match (equivalent to OR among the SHOULD clauses).
    Should,
    /// The clause must match.
    Filter,
}

impl fmt::Display for Occur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occur::Should => write!(f, "SHOULD"),
            Occur::Filter => write!(f, "FILTER"),
        }
    }
}

/// A single-term query on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermQuery {
    pub field: String,
    pub term: String,
}

impl TermQuery {
    pub fn new(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            term: term.into(),
        }
    }
}

/// A clause in a boolean query.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanClause {
    pub query: QueryNode,
    pub occur: Occur,
}

impl BooleanClause {
    pub fn should(query: QueryNode) -> Self {
        Self {
            query,
            occur: Occur::Should,
        }
    }

    pub fn filter(query: QueryNode) -> Self {
        Self {
            query,
            occur: Occur::Filter,
        }
    }
}

/// A node of a parsed query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    Term(TermQuery),
    Boolean(Vec<BooleanClause>),
    /// A query the engine cannot evaluate, holding the original text.
    /// Matches nothing.
    NotImplemented(String),
}

impl QueryNode {
    pub fn term(field: impl Into<String>, term: impl Into<String>) -> Self {
        QueryNode::Term(TermQuery::new(field, term))
    }

    /// Whether the document satisfies this query.
    ///
    /// A boolean query requires every FILTER clause and, when SHOULD clauses
    /// are present, at least one of them.
    pub fn evaluate(&self, doc: &impl TermSource) -> bool {
        match self {
            QueryNode::Term(tq) => {
                let term = tq.term.to_lowercase();
                if tq.field == ALL_TEXT_FIELD {
                    doc.has_term_in_any_field(&term)
                } else {
                    doc.has_term(&tq.field, &term)
                }
            }
            QueryNode::Boolean(clauses) => {
                let mut has_should = false;
                let mut should_matched = false;
                for clause in clauses {
                    match clause.occur {
                        Occur::Filter => {
                            if !clause.query.evaluate(doc) {
                                return false;
                            }
                        }
                        Occur::Should => {
                            has_should = true;
                            if !should_matched {
                                should_matched = clause.query.evaluate(doc);
                            }
                        }
                    }
                }
                !has_should || should_matched
            }
            QueryNode::NotImplemented(_) => false,
        }
    }

    /// False if this node, or any node below it, could not be implemented.
    pub fn is_implemented(&self) -> bool {
        self.not_implemented().is_empty()
    }

    /// The original text of every unimplemented node in this tree.
    pub fn not_implemented(&self) -> Vec<&str> {
        match self {
            QueryNode::Term(_) => Vec::new(),
            QueryNode::Boolean(clauses) => clauses
                .iter()
                .flat_map(|c| c.query.not_implemented())
                .collect(),
            QueryNode::NotImplemented(text) => vec![text.as_str()],
        }
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryNode::Term(tq) => write!(f, "{}:{}", tq.field, tq.term),
            QueryNode::Boolean(clauses) => {
                write!(f, "(")?;
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{} {}", clause.occur, clause.query)?;
                }
                write!(f, ")")
            }
            QueryNode::NotImplemented(text) => write!(f, "NotImplemented[{text}]"),
        }
    }
}

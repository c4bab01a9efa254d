//! Error types shared by every search backend.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, SearchError>;

/// A single failed element of a batch operation.
#[derive(Debug)]
pub struct ItemFailure {
    /// What failed, e.g. a document id or `id@index`.
    pub item: String,
    /// Why it failed.
    pub error: SearchError,
}

/// Errors raised by search backends.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query text could not be understood.
    ///
    /// Query parsing degrades to an empty-match query instead of surfacing
    /// this to callers of `query()`; it is only visible at the parser level.
    #[error("Query parse error: {0}")]
    Parse(String),

    /// A field name could not be routed to a registered index.
    #[error("Routing error: {0}")]
    Routing(String),

    /// A document could not be converted to its wire representation.
    #[error("Marshal error: {0}")]
    Marshal(String),

    /// The remote service could not be reached.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote service answered with a non-success status.
    #[error("HTTP {status} {reason}: {body}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another error, annotated with the operation that failed.
    #[error("Failed to {operation}: {source}")]
    Context {
        operation: String,
        #[source]
        source: Box<SearchError>,
    },

    /// Some elements of a batch failed; the others were processed.
    #[error("{operation}: {} of {total} failed{}", .failures.len(), summarize(.failures))]
    Batch {
        operation: String,
        total: usize,
        failures: Vec<ItemFailure>,
    },
}

fn summarize(failures: &[ItemFailure]) -> String {
    match failures.first() {
        Some(first) if failures.len() == 1 => format!(" ({}: {})", first.item, first.error),
        Some(first) => format!(
            " (first: {}: {}; and {} more)",
            first.item,
            first.error,
            failures.len() - 1
        ),
        None => String::new(),
    }
}

impl SearchError {
    pub fn parse(msg: impl Into<String>) -> Self {
        SearchError::Parse(msg.into())
    }

    pub fn routing(msg: impl Into<String>) -> Self {
        SearchError::Routing(msg.into())
    }

    pub fn marshal(msg: impl Into<String>) -> Self {
        SearchError::Marshal(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        SearchError::Transport(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        SearchError::InvalidConfig(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        SearchError::InvalidArgument(msg.into())
    }

    pub fn http(status: u16, reason: impl Into<String>, body: impl Into<String>) -> Self {
        SearchError::Http {
            status,
            reason: reason.into(),
            body: body.into(),
        }
    }

    /// Wrap this error with the operation that was being attempted.
    pub fn context(self, operation: impl Into<String>) -> Self {
        SearchError::Context {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// Collect batch failures into a single error, or `Ok(())` if there were none.
    pub fn check_batch(
        operation: impl Into<String>,
        total: usize,
        failures: Vec<ItemFailure>,
    ) -> Result<()> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(SearchError::Batch {
                operation: operation.into(),
                total,
                failures,
            })
        }
    }

    /// The innermost error, skipping any `Context` wrappers.
    pub fn root_cause(&self) -> &SearchError {
        match self {
            SearchError::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn is_routing(&self) -> bool {
        matches!(self.root_cause(), SearchError::Routing(_))
    }

    pub fn is_marshal(&self) -> bool {
        matches!(self.root_cause(), SearchError::Marshal(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self.root_cause(), SearchError::Transport(_))
    }

    /// Failures of a `Batch` error, empty for any other kind.
    pub fn failures(&self) -> &[ItemFailure] {
        match self {
            SearchError::Batch { failures, .. } => failures,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_root_cause() {
        let err = SearchError::routing("unknown index 'bogus'").context("add document 'u1'");
        assert!(err.is_routing());
        assert_eq!(
            err.to_string(),
            "Failed to add document 'u1': Routing error: unknown index 'bogus'"
        );
    }

    #[test]
    fn test_check_batch() {
        assert!(SearchError::check_batch("add", 3, Vec::new()).is_ok());

        let failures = vec![ItemFailure {
            item: "u2".to_string(),
            error: SearchError::transport("connection refused"),
        }];
        let err = SearchError::check_batch("add", 3, failures).unwrap_err();
        assert_eq!(err.failures().len(), 1);
        assert_eq!(
            err.to_string(),
            "add: 1 of 3 failed (u2: Transport error: connection refused)"
        );
    }
}

//! # Searchplex
//!
//! Interchangeable full-text and faceted search backends behind one contract.
//!
//! ## Features
//!
//! - In-memory engine with term queries, filters, facets, sorting and paging
//! - Remote engine that routes `index:field` names to several indexes of an
//!   HTTP document store
//! - Logging decorator for any engine
//! - Engines built from JSON configuration
// Core modules
mod config;
mod data;
mod engine;
mod error;
pub mod logging;
pub mod memory;
pub mod query;
pub mod remote;
mod response;

// Re-exports for the public API
pub use config::{EngineConfig, SearchEngineFactory};
pub use data::{DOC_ID_FIELD, FieldValue, InputDocument, InputField, flatten_values};
pub use engine::SearchEngine;
pub use error::{ItemFailure, Result, SearchError};
pub use logging::LoggingSearchEngine;
pub use memory::MemorySearchEngine;
pub use query::{ALL_TEXT_FIELD, QueryNode, QueryParser, SearchQuery, SortField, SortOrder};
pub use remote::{HttpResponse, HttpTransport, RemoteConfig, RemoteSearchEngine};
pub use response::{FacetCount, FacetField, Highlights, ResultDocument, SearchResponse};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

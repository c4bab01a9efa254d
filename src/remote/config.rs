//! Configuration of the remote engine and the registry of its indexes.

use serde::{Deserialize, Serialize};

use crate::data::InputDocument;
use crate::error::{Result, SearchError};

/// Default connection timeout, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Where the remote document store lives and which indexes it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the store, e.g. `http://localhost:9200`.
    pub base_url: String,

    /// Index receiving unqualified fields. Queries and counts run against it.
    pub default_index: String,

    /// Indexes reachable through `index:field` qualifiers.
    #[serde(default)]
    pub secondary_indexes: Vec<String>,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, default_index: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_index: default_index.into(),
            secondary_indexes: Vec::new(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn with_secondary_index(mut self, index: impl Into<String>) -> Self {
        self.secondary_indexes.push(index.into());
        self
    }

    pub fn with_timeouts(mut self, connect_timeout_secs: u64, request_timeout_secs: u64) -> Self {
        self.connect_timeout_secs = connect_timeout_secs;
        self.request_timeout_secs = request_timeout_secs;
        self
    }

    /// Check the configuration for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim_end_matches('/').is_empty() {
            return Err(SearchError::invalid_config("base_url must not be empty"));
        }
        validate_index_name(&self.default_index)?;

        for (i, index) in self.secondary_indexes.iter().enumerate() {
            validate_index_name(index)?;
            if *index == self.default_index {
                return Err(SearchError::invalid_config(format!(
                    "default index '{index}' must not also be a secondary index"
                )));
            }
            if self.secondary_indexes[..i].contains(index) {
                return Err(SearchError::invalid_config(format!(
                    "secondary index '{index}' is listed twice"
                )));
            }
        }

        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(SearchError::invalid_config("timeouts must be positive"));
        }
        Ok(())
    }
}

/// Index names end up in URL paths and field qualifiers.
fn validate_index_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SearchError::invalid_config("index names must not be empty"));
    }
    if name.contains([':', '/']) || name.chars().any(char::is_whitespace) {
        return Err(SearchError::invalid_config(format!(
            "invalid index name '{name}'"
        )));
    }
    Ok(())
}

/// The validated set of indexes a remote engine writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRegistry {
    base_url: String,
    default_index: String,
    secondary_indexes: Vec<String>,
}

impl IndexRegistry {
    /// Build a registry from a configuration, validating it first.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_index: config.default_index.clone(),
            secondary_indexes: config.secondary_indexes.clone(),
        })
    }

    /// The base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_index(&self) -> &str {
        &self.default_index
    }

    pub fn secondary_indexes(&self) -> &[String] {
        &self.secondary_indexes
    }

    /// Every registered index, default first.
    pub fn all_indexes(&self) -> Vec<&str> {
        std::iter::once(self.default_index.as_str())
            .chain(self.secondary_indexes.iter().map(String::as_str))
            .collect()
    }

    pub fn contains(&self, index: &str) -> bool {
        self.default_index == index || self.secondary_indexes.iter().any(|s| s == index)
    }

    pub fn index_url(&self, index: &str) -> String {
        format!("{}/{index}", self.base_url)
    }

    pub fn default_index_url(&self) -> String {
        self.index_url(&self.default_index)
    }

    pub fn create_input_document(&self) -> InputDocument {
        InputDocument::new()
    }
}

//! Declarative engine configuration and the factory building engines from it.
//!
//! ```
//! use searchplex::{EngineConfig, SearchEngine, SearchEngineFactory};
//!
//! let config = EngineConfig::from_json(r#"{"type": "logging", "wraps": {"type": "memory"}}"#).unwrap();
//! let engine = SearchEngineFactory::create(&config).unwrap();
//! assert_eq!(engine.document_count().unwrap(), 0);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::SearchEngine;
use crate::error::Result;
use crate::logging::{DEFAULT_NAME_FIELD, LoggingSearchEngine};
use crate::memory::MemorySearchEngine;
use crate::remote::{RemoteConfig, RemoteSearchEngine};

fn default_name_field() -> String {
    DEFAULT_NAME_FIELD.to_string()
}

/// Which backend to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineConfig {
    /// In-memory engine.
    Memory,

    /// Multi-index remote engine.
    Remote(RemoteConfig),

    /// Logging decorator around another engine.
    Logging {
        wraps: Box<EngineConfig>,
        #[serde(default = "default_name_field")]
        name_field: String,
    },
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn logging(wraps: EngineConfig) -> Self {
        EngineConfig::Logging {
            wraps: Box::new(wraps),
            name_field: default_name_field(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            EngineConfig::Memory => Ok(()),
            EngineConfig::Remote(config) => config.validate(),
            EngineConfig::Logging { wraps, .. } => wraps.validate(),
        }
    }
}

/// Builds engines from [`EngineConfig`].
pub struct SearchEngineFactory;

impl SearchEngineFactory {
    pub fn create(config: &EngineConfig) -> Result<Arc<dyn SearchEngine>> {
        match config {
            EngineConfig::Memory => Ok(Arc::new(MemorySearchEngine::new())),
            EngineConfig::Remote(remote) => Ok(Arc::new(RemoteSearchEngine::new(remote.clone())?)),
            EngineConfig::Logging { wraps, name_field } => {
                let inner = Self::create(wraps)?;
                Ok(Arc::new(
                    LoggingSearchEngine::new(inner).with_name_field(name_field.clone()),
                ))
            }
        }
    }
}

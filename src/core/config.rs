//! Engine configuration
//!
//! Loaded from TOML. Every key is optional:
//!
//! ```toml
//! decision_cache_capacity = 1000
//! reject_duplicate_ids = false
//! ```

use crate::error::{AccessError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Settings for a [`PolicyStore`](crate::PolicyStore)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EngineConfig {
    /// Decisions cached per index snapshot; 0 disables caching
    #[validate(range(max = 1000000))]
    pub decision_cache_capacity: usize,

    /// Fail rebuilds whose collections repeat an id instead of merging the
    /// repeated entities
    pub reject_duplicate_ids: bool,
}

impl EngineConfig {
    /// Default decision cache capacity (matches the engine's 1000-entry default)
    pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(input).map_err(|e| AccessError::Config(e.to_string()))?;
        config
            .validate()
            .map_err(|e| AccessError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Disable the decision cache
    pub fn without_cache(mut self) -> Self {
        self.decision_cache_capacity = 0;
        self
    }

    /// Reject duplicate ids on rebuild
    pub fn strict(mut self) -> Self {
        self.reject_duplicate_ids = true;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            decision_cache_capacity: Self::DEFAULT_CACHE_CAPACITY,
            reject_duplicate_ids: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_parse_all_keys() {
        let config = EngineConfig::from_toml_str(
            "decision_cache_capacity = 64\nreject_duplicate_ids = true\n",
        )
        .unwrap();

        assert_eq!(config.decision_cache_capacity, 64);
        assert!(config.reject_duplicate_ids);
    }

    #[test]
    fn test_out_of_range_capacity() {
        let result = EngineConfig::from_toml_str("decision_cache_capacity = 5000000");
        assert!(matches!(result, Err(AccessError::Config(_))));
    }

    #[test]
    fn test_wrong_type() {
        let result = EngineConfig::from_toml_str("reject_duplicate_ids = \"yes\"");
        assert!(matches!(result, Err(AccessError::Config(_))));
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default().without_cache().strict();
        assert_eq!(config.decision_cache_capacity, 0);
        assert!(config.reject_duplicate_ids);
    }
}

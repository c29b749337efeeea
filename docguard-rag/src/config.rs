//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// How retrieved documents are returned to the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Return the reranked index documents themselves.
    Flat,
    /// Search over child chunks, return their parent documents.
    #[default]
    ParentPromotion,
}

impl std::str::FromStr for RetrievalMode {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(RetrievalMode::Flat),
            "parent_promotion" | "parent" => Ok(RetrievalMode::ParentPromotion),
            other => Err(RagError::Config(format!("unknown retrieval mode: {other}"))),
        }
    }
}

/// Configuration parameters for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of candidates requested from the index.
    pub initial_k: usize,
    /// Number of results returned after reranking.
    pub top_k: usize,
    /// Rerank pool multiplier applied to `top_k` in parent-promotion mode.
    pub fetch_multiplier: usize,
    /// Number of content characters used in the reconciliation key.
    pub key_prefix_chars: usize,
    /// Metadata key linking a child chunk to its parent document.
    pub parent_id_key: String,
    /// Retrieval mode.
    pub mode: RetrievalMode,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            initial_k: 20,
            top_k: 4,
            fetch_multiplier: 3,
            key_prefix_chars: 200,
            parent_id_key: "doc_id".to_string(),
            mode: RetrievalMode::ParentPromotion,
        }
    }
}

impl RetrievalConfig {
    /// Create a new builder for constructing a [`RetrievalConfig`].
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder::default()
    }

    /// Check that the parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `initial_k == 0` or `top_k == 0`
    /// - `fetch_multiplier == 0`
    /// - `key_prefix_chars == 0`
    /// - `parent_id_key` is empty
    pub fn validate(&self) -> Result<()> {
        if self.initial_k == 0 {
            return Err(RagError::Config("initial_k must be greater than zero".to_string()));
        }
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if self.fetch_multiplier == 0 {
            return Err(RagError::Config("fetch_multiplier must be at least 1".to_string()));
        }
        if self.key_prefix_chars == 0 {
            return Err(RagError::Config("key_prefix_chars must be greater than zero".to_string()));
        }
        if self.parent_id_key.is_empty() {
            return Err(RagError::Config("parent_id_key must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RetrievalConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    /// Set the number of candidates requested from the index.
    pub fn initial_k(mut self, k: usize) -> Self {
        self.config.initial_k = k;
        self
    }

    /// Set the number of results returned.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the rerank pool multiplier used in parent-promotion mode.
    pub fn fetch_multiplier(mut self, multiplier: usize) -> Self {
        self.config.fetch_multiplier = multiplier;
        self
    }

    /// Set how many content characters go into the reconciliation key.
    pub fn key_prefix_chars(mut self, chars: usize) -> Self {
        self.config.key_prefix_chars = chars;
        self
    }

    /// Set the metadata key that links children to parents.
    pub fn parent_id_key(mut self, key: impl Into<String>) -> Self {
        self.config.parent_id_key = key.into();
        self
    }

    /// Set the retrieval mode.
    pub fn mode(mut self, mode: RetrievalMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Build the [`RetrievalConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RetrievalConfig::validate`].
    pub fn build(self) -> Result<RetrievalConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RetrievalConfig::builder().build().unwrap();
        assert_eq!(config, RetrievalConfig::default());
        assert_eq!(config.mode, RetrievalMode::ParentPromotion);
    }

    #[test]
    fn rejects_zero_top_k() {
        let err = RetrievalConfig::builder().top_k(0).build().unwrap_err();
        assert!(matches!(err, RagError::Config(msg) if msg.contains("top_k")));
    }

    #[test]
    fn rejects_zero_multiplier_and_empty_parent_key() {
        assert!(RetrievalConfig::builder().fetch_multiplier(0).build().is_err());
        assert!(RetrievalConfig::builder().parent_id_key("").build().is_err());
        assert!(RetrievalConfig::builder().initial_k(0).build().is_err());
        assert!(RetrievalConfig::builder().key_prefix_chars(0).build().is_err());
    }

    #[test]
    fn deserializes_partial_config_with_defaults() {
        let config: RetrievalConfig =
            serde_json::from_str(r#"{"top_k": 8, "mode": "flat"}"#).unwrap();
        assert_eq!(config.top_k, 8);
        assert_eq!(config.mode, RetrievalMode::Flat);
        assert_eq!(config.initial_k, 20);
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("flat".parse::<RetrievalMode>().unwrap(), RetrievalMode::Flat);
        assert_eq!(" Parent_Promotion ".parse::<RetrievalMode>().unwrap(), RetrievalMode::ParentPromotion);
        assert!("hybrid".parse::<RetrievalMode>().is_err());
    }
}

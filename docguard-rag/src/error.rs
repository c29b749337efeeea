//! Error types for the `docguard-rag` crate.

use thiserror::Error;

/// Errors that can occur during retrieval.
///
/// Each external-dependency variant names the dependency that failed so callers
/// can tell an index outage from a reranker or parent-store outage. An empty
/// result set is never an error.
#[derive(Debug, Error)]
pub enum RagError {
    /// The nearest-neighbor index failed.
    #[error("Score index error ({backend}): {message}")]
    ScoreIndex {
        /// The index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The reranker failed.
    #[error("Reranker error ({reranker}): {message}")]
    Reranker {
        /// The reranker that produced the error.
        reranker: String,
        /// A description of the failure.
        message: String,
    },

    /// The parent document store failed.
    #[error("Parent store error ({backend}): {message}")]
    ParentStore {
        /// The store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// Embedding generation failed.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RagError {
    /// Short name of the dependency this error is attributed to.
    pub fn dependency(&self) -> &'static str {
        match self {
            RagError::ScoreIndex { .. } => "score_index",
            RagError::Reranker { .. } => "reranker",
            RagError::ParentStore { .. } => "parent_store",
            RagError::Embedding { .. } => "embedding",
            RagError::Config(_) => "config",
        }
    }
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;

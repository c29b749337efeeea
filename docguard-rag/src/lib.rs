//! Two-stage document retrieval for docguard.
//!
//! This crate provides:
//! - Document and scored-result types
//! - Seams for the external nearest-neighbor index, reranker and parent store
//! - A retrieval pipeline with flat and parent-promotion modes
//! - Content-keyed reconciliation of reranked documents with index distances
//! - In-memory backends, plus a SQLite parent store behind the `sqlite` feature

pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod inmemory;
pub mod parent;
pub mod pipeline;
pub mod reconcile;
pub mod reranker;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::{RetrievalConfig, RetrievalConfigBuilder, RetrievalMode};
pub use document::{Document, SOURCE_KEY, ScoredDocument, UNKNOWN_SOURCE};
pub use error::{RagError, Result};
pub use index::{EmbeddingProvider, ScoreIndex};
pub use inmemory::InMemoryScoreIndex;
pub use parent::{InMemoryParentStore, ParentStore};
pub use pipeline::{RetrievalPipeline, RetrievalPipelineBuilder};
pub use reconcile::{DistanceMap, DocKey, ParentHit, ParentHits, UNMATCHED_DISTANCE};
pub use reranker::{KeywordReranker, NoOpReranker, Reranker};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteParentStore;

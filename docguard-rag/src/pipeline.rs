//! Two-stage retrieval orchestrator.
//!
//! The [`RetrievalPipeline`] composes a [`ScoreIndex`], a [`Reranker`] and,
//! in parent-promotion mode, a [`ParentStore`]:
//!
//! 1. broad nearest-neighbor search for `initial_k` candidates
//! 2. relevance reranking of those candidates
//! 3. reconciliation of each reranked document with its original distance
//! 4. (parent mode) collapse of children onto their parents
//!
//! Distances always come from the index, so downstream confidence scoring sees
//! the embedding-space signal even though ordering comes from the reranker.
//!
//! # Example
//!
//! ```rust,ignore
//! use docguard_rag::{RetrievalPipeline, RetrievalConfig, InMemoryParentStore, KeywordReranker};
//!
//! let pipeline = RetrievalPipeline::builder()
//!     .config(RetrievalConfig::default())
//!     .index(Arc::new(index))
//!     .reranker(Arc::new(KeywordReranker::default()))
//!     .parent_store(Arc::new(InMemoryParentStore::new()))
//!     .build()?;
//!
//! let results = pipeline.retrieve("how do I reset the device?").await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::{RetrievalConfig, RetrievalMode};
use crate::document::{Document, SOURCE_KEY, ScoredDocument};
use crate::error::{RagError, Result};
use crate::index::ScoreIndex;
use crate::parent::ParentStore;
use crate::reconcile::{DistanceMap, ParentHits, UNMATCHED_DISTANCE};
use crate::reranker::{NoOpReranker, Reranker};

/// The retrieval pipeline. Construct one via [`RetrievalPipeline::builder()`].
///
/// The pipeline holds no per-request state and can be shared across
/// concurrent requests behind an `Arc`.
pub struct RetrievalPipeline {
    config: RetrievalConfig,
    index: Arc<dyn ScoreIndex>,
    reranker: Arc<dyn Reranker>,
    parent_store: Option<Arc<dyn ParentStore>>,
}

impl RetrievalPipeline {
    /// Create a new [`RetrievalPipelineBuilder`].
    pub fn builder() -> RetrievalPipelineBuilder {
        RetrievalPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve with the configured `initial_k`, `top_k` and mode.
    ///
    /// # Errors
    ///
    /// Returns the [`RagError`] variant of whichever dependency failed.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredDocument>> {
        self.retrieve_with(query, self.config.initial_k, self.config.top_k).await
    }

    /// Retrieve with explicit candidate and result counts, in the configured mode.
    ///
    /// An empty list means the index had no evidence for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if either count is zero, otherwise the
    /// variant of whichever dependency failed.
    pub async fn retrieve_with(
        &self,
        query: &str,
        initial_k: usize,
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        if initial_k == 0 || top_k == 0 {
            return Err(RagError::Config(format!(
                "initial_k ({initial_k}) and top_k ({top_k}) must be greater than zero"
            )));
        }
        match self.config.mode {
            RetrievalMode::Flat => self.retrieve_flat(query, initial_k, top_k).await,
            RetrievalMode::ParentPromotion => self.retrieve_parents(query, initial_k, top_k).await,
        }
    }

    /// Search, rerank, and return the reranked index documents with their
    /// original distances, in reranked order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ScoreIndex`] or [`RagError::Reranker`].
    pub async fn retrieve_flat(
        &self,
        query: &str,
        initial_k: usize,
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let candidates = self.search(query, initial_k).await?;
        if candidates.is_empty() {
            info!(result_count = 0, "no candidates from index");
            return Ok(Vec::new());
        }

        let distances = DistanceMap::from_candidates(&candidates, self.config.key_prefix_chars);
        let docs: Vec<Document> = candidates.into_iter().map(|c| c.document).collect();
        let reranked = self.rerank(query, docs, top_k).await?;

        let results: Vec<ScoredDocument> = reranked
            .into_iter()
            .map(|doc| {
                let distance = self.reconcile(&distances, &doc);
                ScoredDocument::new(doc, distance)
            })
            .collect();

        info!(result_count = results.len(), "flat retrieval completed");
        Ok(results)
    }

    /// Search children, rerank them, and return their deduplicated parents,
    /// each paired with its best child distance.
    ///
    /// Children without a parent id are dropped. Parents missing from the
    /// store are dropped silently.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if no parent store is configured, otherwise
    /// [`RagError::ScoreIndex`], [`RagError::Reranker`] or [`RagError::ParentStore`].
    pub async fn retrieve_parents(
        &self,
        query: &str,
        initial_k: usize,
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let store = self.parent_store.as_ref().ok_or_else(|| {
            RagError::Config("parent promotion requires a parent store".to_string())
        })?;
        let parent_key = self.config.parent_id_key.as_str();

        let candidates = self.search(query, initial_k).await?;
        if candidates.is_empty() {
            info!(result_count = 0, "no candidates from index");
            return Ok(Vec::new());
        }

        let candidate_count = candidates.len();
        let children: Vec<ScoredDocument> = candidates
            .into_iter()
            .filter(|c| c.document.parent_id(parent_key).is_some())
            .collect();
        if children.len() < candidate_count {
            debug!(
                dropped = candidate_count - children.len(),
                "dropped candidates without a parent id"
            );
        }
        if children.is_empty() {
            return Ok(Vec::new());
        }

        let mut best_by_parent: HashMap<String, f64> = HashMap::new();
        for child in &children {
            if let Some(parent_id) = child.document.parent_id(parent_key) {
                best_by_parent
                    .entry(parent_id.to_string())
                    .and_modify(|d| *d = d.min(child.distance))
                    .or_insert(child.distance);
            }
        }

        let distances = DistanceMap::from_candidates(&children, self.config.key_prefix_chars);
        let pool = top_k.saturating_mul(self.config.fetch_multiplier);
        let docs: Vec<Document> = children.into_iter().map(|c| c.document).collect();
        let reranked = self.rerank(query, docs, pool).await?;

        let mut hits = ParentHits::new();
        for child in &reranked {
            let Some(parent_id) = child.parent_id(parent_key) else {
                warn!(source = child.source_or_unknown(), "reranked child lost its parent id");
                continue;
            };
            let child_distance = self.reconcile(&distances, child);
            let distance = best_by_parent
                .get(parent_id)
                .map_or(child_distance, |best| best.min(child_distance));
            hits.record(parent_id, distance, child.source());
        }

        if hits.is_empty() {
            info!(result_count = 0, "no parent ids survived reranking");
            return Ok(Vec::new());
        }

        let fetched = store.batch_get(hits.ids()).await.map_err(|e| {
            error!(backend = store.name(), error = %e, "parent store fetch failed");
            match e {
                e @ RagError::ParentStore { .. } => e,
                other => RagError::ParentStore {
                    backend: store.name().to_string(),
                    message: other.to_string(),
                },
            }
        })?;

        let mut results = Vec::with_capacity(top_k);
        for (parent_id, parent) in hits.ids().iter().zip(fetched) {
            let Some(parent) = parent else {
                debug!(parent_id = %parent_id, "parent missing from store");
                continue;
            };
            let Some(hit) = hits.get(parent_id) else {
                continue;
            };
            let parent = match (&hit.first_child_source, parent.source()) {
                (Some(source), None) => parent.with_metadata(SOURCE_KEY, source.clone()),
                _ => parent,
            };
            results.push(ScoredDocument::new(parent, hit.distance));
            if results.len() == top_k {
                break;
            }
        }

        info!(
            candidate_count,
            parent_count = hits.len(),
            result_count = results.len(),
            "parent retrieval completed"
        );
        Ok(results)
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>> {
        let candidates = self.index.search(query, k).await.map_err(|e| {
            error!(backend = self.index.name(), error = %e, "index search failed");
            match e {
                e @ RagError::ScoreIndex { .. } => e,
                other => RagError::ScoreIndex {
                    backend: self.index.name().to_string(),
                    message: other.to_string(),
                },
            }
        })?;
        debug!(candidate_count = candidates.len(), requested = k, "index search returned");
        Ok(candidates)
    }

    async fn rerank(&self, query: &str, docs: Vec<Document>, top_n: usize) -> Result<Vec<Document>> {
        let input_count = docs.len();
        let mut reranked = self.reranker.rerank(query, docs, top_n).await.map_err(|e| {
            error!(reranker = self.reranker.name(), error = %e, "reranking failed");
            match e {
                e @ RagError::Reranker { .. } => e,
                other => RagError::Reranker {
                    reranker: self.reranker.name().to_string(),
                    message: other.to_string(),
                },
            }
        })?;
        // Enforce the contract even for rerankers that over-return.
        reranked.truncate(top_n.min(input_count));
        Ok(reranked)
    }

    fn reconcile(&self, distances: &DistanceMap, doc: &Document) -> f64 {
        distances.get(doc).unwrap_or_else(|| {
            warn!(
                source = doc.source_or_unknown(),
                sentinel = UNMATCHED_DISTANCE,
                "reranked document did not match any candidate"
            );
            UNMATCHED_DISTANCE
        })
    }
}

/// Builder for constructing a [`RetrievalPipeline`].
///
/// `index` is required. `reranker` defaults to [`NoOpReranker`]. A
/// `parent_store` is required when the config selects
/// [`RetrievalMode::ParentPromotion`].
#[derive(Default)]
pub struct RetrievalPipelineBuilder {
    config: Option<RetrievalConfig>,
    index: Option<Arc<dyn ScoreIndex>>,
    reranker: Option<Arc<dyn Reranker>>,
    parent_store: Option<Arc<dyn ParentStore>>,
}

impl RetrievalPipelineBuilder {
    /// Set the pipeline configuration. Defaults to [`RetrievalConfig::default`].
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the nearest-neighbor index.
    pub fn index(mut self, index: Arc<dyn ScoreIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the reranker.
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Set the parent document store.
    pub fn parent_store(mut self, store: Arc<dyn ParentStore>) -> Self {
        self.parent_store = Some(store);
        self
    }

    /// Build the [`RetrievalPipeline`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the config is invalid, the index is
    /// missing, or parent promotion is selected without a parent store.
    pub fn build(self) -> Result<RetrievalPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let index = self.index.ok_or_else(|| RagError::Config("index is required".to_string()))?;
        if config.mode == RetrievalMode::ParentPromotion && self.parent_store.is_none() {
            return Err(RagError::Config(
                "parent_store is required in parent_promotion mode".to_string(),
            ));
        }

        Ok(RetrievalPipeline {
            config,
            index,
            reranker: self.reranker.unwrap_or_else(|| Arc::new(NoOpReranker)),
            parent_store: self.parent_store,
        })
    }
}

//! In-memory score index using cosine distance.
//!
//! [`InMemoryScoreIndex`] keeps `(document, embedding)` pairs in a `Vec`
//! behind a `tokio::sync::RwLock` and embeds queries through an injected
//! [`EmbeddingProvider`]. It is meant for development, tests, and small corpora.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Document, ScoredDocument};
use crate::error::{RagError, Result};
use crate::index::{EmbeddingProvider, ScoreIndex};

struct Entry {
    document: Document,
    embedding: Vec<f32>,
}

/// An in-memory [`ScoreIndex`] returning cosine distance (`1 - cosine similarity`).
pub struct InMemoryScoreIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Vec<Entry>>,
}

impl InMemoryScoreIndex {
    /// Create an empty index that embeds with `embedder`.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder, entries: RwLock::new(Vec::new()) }
    }

    /// Embed and add documents to the index.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] if the provider fails or returns a
    /// vector of the wrong dimensionality.
    pub async fn add(&self, documents: Vec<Document>) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }
        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != documents.len() {
            return Err(RagError::Embedding {
                provider: "in_memory".to_string(),
                message: format!(
                    "expected {} embeddings, provider returned {}",
                    documents.len(),
                    embeddings.len()
                ),
            });
        }

        let dimensions = self.embedder.dimensions();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimensions) {
            return Err(RagError::Embedding {
                provider: "in_memory".to_string(),
                message: format!("embedding has {} dimensions, expected {dimensions}", bad.len()),
            });
        }

        let mut entries = self.entries.write().await;
        entries.extend(
            documents.into_iter().zip(embeddings).map(|(document, embedding)| Entry { document, embedding }),
        );
        debug!(entry_count = entries.len(), "in-memory index updated");
        Ok(())
    }

    /// Number of indexed documents.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the index holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Cosine distance between two vectors.
///
/// Returns 1.0 (orthogonal) if either vector has zero magnitude.
fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl ScoreIndex for InMemoryScoreIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>> {
        if k == 0 || self.is_empty().await {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await.map_err(|e| RagError::ScoreIndex {
            backend: self.name().to_string(),
            message: format!("query embedding failed: {e}"),
        })?;
        let dimensions = self.embedder.dimensions();
        if query_embedding.len() != dimensions {
            return Err(RagError::ScoreIndex {
                backend: self.name().to_string(),
                message: format!(
                    "query embedding has {} dimensions, expected {dimensions}",
                    query_embedding.len()
                ),
            });
        }

        let entries = self.entries.read().await;
        let mut scored: Vec<ScoredDocument> = entries
            .iter()
            .map(|entry| {
                let distance = cosine_distance(&entry.embedding, &query_embedding);
                ScoredDocument::new(entry.document.clone(), distance)
            })
            .collect();

        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(k);
        Ok(scored)
    }

    fn name(&self) -> &str {
        "in_memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Embeds text as counts of the letters a, b and c.
    struct LetterEmbedder;

    #[async_trait]
    impl EmbeddingProvider for LetterEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(['a', 'b', 'c']
                .iter()
                .map(|letter| text.chars().filter(|c| c == letter).count() as f32)
                .collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    /// Like [`LetterEmbedder`], but returns two dimensions for the text "bad".
    struct ShortOnBad;

    #[async_trait]
    impl EmbeddingProvider for ShortOnBad {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text == "bad" {
                return Ok(vec![1.0, 0.0]);
            }
            LetterEmbedder.embed(text).await
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    #[test]
    fn cosine_distance_bounds() {
        assert!(cosine_distance(&[1.0, 0.0], &[2.0, 0.0]).abs() < 1e-12);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-12);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[tokio::test]
    async fn empty_index_returns_empty_list() {
        let index = InMemoryScoreIndex::new(Arc::new(LetterEmbedder));
        assert!(index.search("abc", 5).await.unwrap().is_empty());
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn search_orders_by_ascending_distance() {
        let index = InMemoryScoreIndex::new(Arc::new(LetterEmbedder));
        index
            .add(vec![
                Document::new("ccc").with_source("c"),
                Document::new("aaa").with_source("a"),
                Document::new("aab").with_source("ab"),
            ])
            .await
            .unwrap();

        let results = index.search("aaaa", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.source(), Some("a"));
        assert_eq!(results[1].document.source(), Some("ab"));
        assert!(results[0].distance <= results[1].distance);
    }

    #[tokio::test]
    async fn fewer_documents_than_k() {
        let index = InMemoryScoreIndex::new(Arc::new(LetterEmbedder));
        index.add(vec![Document::new("a")]).await.unwrap();
        assert_eq!(index.search("a", 10).await.unwrap().len(), 1);
        assert_eq!(index.len().await, 1);
    }

    #[tokio::test]
    async fn failed_add_leaves_index_unchanged() {
        let index = InMemoryScoreIndex::new(Arc::new(ShortOnBad));
        let err = index
            .add(vec![Document::new("good one"), Document::new("bad"), Document::new("good two")])
            .await
            .unwrap_err();

        assert_eq!(err.dependency(), "embedding");
        assert_eq!(index.len().await, 0);
    }

    #[tokio::test]
    async fn query_with_wrong_dimensions_is_rejected() {
        let index = InMemoryScoreIndex::new(Arc::new(ShortOnBad));
        index.add(vec![Document::new("abc")]).await.unwrap();

        let err = index.search("bad", 3).await.unwrap_err();
        assert_eq!(err.dependency(), "score_index");
        assert!(err.to_string().contains("in_memory"));
    }
}

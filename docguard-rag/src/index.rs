//! Nearest-neighbor search seams.

use async_trait::async_trait;

use crate::document::ScoredDocument;
use crate::error::Result;

/// A nearest-neighbor index returning documents with their distance to a query.
///
/// Lower distance means more similar. Implementations may return fewer than
/// `k` results and must return an empty list, not an error, when nothing
/// matches.
///
/// # Example
///
/// ```rust,ignore
/// use docguard_rag::{InMemoryScoreIndex, ScoreIndex};
///
/// let index = InMemoryScoreIndex::new(Arc::new(embedder));
/// index.add(documents).await?;
/// let candidates = index.search("how do I reset?", 20).await?;
/// ```
#[async_trait]
pub trait ScoreIndex: Send + Sync {
    /// Search for up to `k` documents closest to `query`, ascending by distance.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>>;

    /// Backend name used in logs and errors.
    fn name(&self) -> &str {
        "score_index"
    }
}

/// Turns text into vectors for indexes that embed queries themselves.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts. Calls [`embed`](EmbeddingProvider::embed) in order by default.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Length of the produced vectors.
    fn dimensions(&self) -> usize;
}

//! Reranker trait and local implementations.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::document::Document;
use crate::error::Result;

/// Reorders documents by estimated relevance to a query.
///
/// The returned list is a reordered subset of the input with length at most
/// `min(top_n, docs.len())`. Returned documents need not be the same
/// allocations as the inputs, but their `content` and `source` must be
/// preserved so the pipeline can map them back to their index distances.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Rerank `docs` against `query` and keep the best `top_n`.
    async fn rerank(&self, query: &str, docs: Vec<Document>, top_n: usize)
    -> Result<Vec<Document>>;

    /// Reranker name used in logs and errors.
    fn name(&self) -> &str {
        "reranker"
    }
}

/// A reranker that keeps the index order and only truncates.
///
/// # Example
///
/// ```rust,ignore
/// use docguard_rag::NoOpReranker;
///
/// let reranked = NoOpReranker.rerank("query", docs, 4).await?;
/// // same order as the index returned, at most 4 entries
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReranker;

#[async_trait]
impl Reranker for NoOpReranker {
    async fn rerank(
        &self,
        _query: &str,
        mut docs: Vec<Document>,
        top_n: usize,
    ) -> Result<Vec<Document>> {
        docs.truncate(top_n);
        Ok(docs)
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// A lexical reranker that orders documents by how many distinct query terms
/// they contain.
///
/// Terms shorter than `min_term_chars` are ignored. Ties keep their incoming
/// order, so the index ranking breaks ties.
#[derive(Debug, Clone, Copy)]
pub struct KeywordReranker {
    min_term_chars: usize,
}

impl Default for KeywordReranker {
    fn default() -> Self {
        Self { min_term_chars: 3 }
    }
}

impl KeywordReranker {
    pub fn new(min_term_chars: usize) -> Self {
        Self { min_term_chars }
    }

    fn terms(&self, query: &str) -> HashSet<String> {
        query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= self.min_term_chars)
            .map(str::to_lowercase)
            .collect()
    }
}

#[async_trait]
impl Reranker for KeywordReranker {
    async fn rerank(&self, query: &str, docs: Vec<Document>, top_n: usize) -> Result<Vec<Document>> {
        let terms = self.terms(query);

        let mut scored: Vec<(usize, Document)> = docs
            .into_iter()
            .map(|doc| {
                let text = doc.content.to_lowercase();
                let hits = terms.iter().filter(|t| text.contains(t.as_str())).count();
                (hits, doc)
            })
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(top_n);
        Ok(scored.into_iter().map(|(_, doc)| doc).collect())
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<Document> {
        texts.iter().map(|t| Document::new(*t)).collect()
    }

    #[tokio::test]
    async fn noop_truncates_in_order() {
        let out = NoOpReranker.rerank("q", docs(&["a", "b", "c"]), 2).await.unwrap();
        let texts: Vec<&str> = out.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn keyword_reranker_promotes_matching_documents() {
        let reranker = KeywordReranker::default();
        let input = docs(&[
            "general overview of the product",
            "how to reset the router password",
            "router firmware notes",
        ]);
        let out = reranker.rerank("reset router password", input, 3).await.unwrap();
        assert_eq!(out[0].content, "how to reset the router password");
        assert_eq!(out[1].content, "router firmware notes");
        assert_eq!(out[2].content, "general overview of the product");
    }

    #[tokio::test]
    async fn keyword_reranker_keeps_index_order_on_ties() {
        let reranker = KeywordReranker::default();
        let out = reranker.rerank("zzz", docs(&["first", "second"]), 5).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].content, "first");
    }

    #[tokio::test]
    async fn top_n_zero_returns_nothing() {
        let out = KeywordReranker::default().rerank("x", docs(&["a"]), 0).await.unwrap();
        assert!(out.is_empty());
    }
}

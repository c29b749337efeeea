//! Parent document storage keyed by parent id.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::Document;
use crate::error::Result;

/// Key-value store mapping a parent id to the full parent document.
///
/// The retrieval pipeline only reads through [`batch_get`](ParentStore::batch_get);
/// the write methods exist for ingestion and maintenance tooling.
#[async_trait]
pub trait ParentStore: Send + Sync {
    /// Fetch documents for `ids`.
    ///
    /// The result has the same length and order as `ids`. Missing keys are
    /// `None`, not errors.
    async fn batch_get(&self, ids: &[String]) -> Result<Vec<Option<Document>>>;

    /// Insert or replace documents.
    async fn put_many(&self, entries: Vec<(String, Document)>) -> Result<()>;

    /// Delete documents by id. Unknown ids are ignored.
    async fn delete_many(&self, ids: &[String]) -> Result<()>;

    /// All stored ids, in no particular order.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Backend name used in logs and errors.
    fn name(&self) -> &str {
        "parent_store"
    }
}

/// An in-memory [`ParentStore`] backed by a `HashMap` behind a `tokio::sync::RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryParentStore {
    docs: RwLock<HashMap<String, Document>>,
}

impl InMemoryParentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParentStore for InMemoryParentStore {
    async fn batch_get(&self, ids: &[String]) -> Result<Vec<Option<Document>>> {
        let docs = self.docs.read().await;
        Ok(ids.iter().map(|id| docs.get(id).cloned()).collect())
    }

    async fn put_many(&self, entries: Vec<(String, Document)>) -> Result<()> {
        let mut docs = self.docs.write().await;
        docs.extend(entries);
        Ok(())
    }

    async fn delete_many(&self, ids: &[String]) -> Result<()> {
        let mut docs = self.docs.write().await;
        for id in ids {
            docs.remove(id);
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.docs.read().await.keys().cloned().collect())
    }

    fn name(&self) -> &str {
        "in_memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn batch_get_preserves_order_and_marks_missing() {
        let store = InMemoryParentStore::new();
        store
            .put_many(vec![
                ("a".to_string(), Document::new("alpha")),
                ("b".to_string(), Document::new("beta")),
            ])
            .await
            .unwrap();

        let ids = vec!["b".to_string(), "missing".to_string(), "a".to_string()];
        let got = store.batch_get(&ids).await.unwrap();
        assert_eq!(got.len(), 3);
        assert_eq!(got[0].as_ref().unwrap().content, "beta");
        assert!(got[1].is_none());
        assert_eq!(got[2].as_ref().unwrap().content, "alpha");
    }

    #[tokio::test]
    async fn delete_and_keys() {
        let store = InMemoryParentStore::new();
        store
            .put_many(vec![
                ("a".to_string(), Document::new("alpha")),
                ("b".to_string(), Document::new("beta")),
            ])
            .await
            .unwrap();
        store.delete_many(&["a".to_string(), "zzz".to_string()]).await.unwrap();

        let keys = store.keys().await.unwrap();
        assert_eq!(keys, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn put_replaces_existing_entry() {
        let store = InMemoryParentStore::new();
        store.put_many(vec![("a".to_string(), Document::new("old"))]).await.unwrap();
        store.put_many(vec![("a".to_string(), Document::new("new"))]).await.unwrap();
        let got = store.batch_get(&["a".to_string()]).await.unwrap();
        assert_eq!(got[0].as_ref().unwrap().content, "new");
    }
}

//! Data types for documents and scored retrieval results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata key holding the citable source identifier of a document.
pub const SOURCE_KEY: &str = "source";

/// Fallback source label used when a document carries no `source` metadata.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// An immutable text unit with metadata.
///
/// Documents are never edited after they leave a backend; helpers such as
/// [`Document::with_metadata`] consume `self` and return a new record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Document {
    /// The text content of the document.
    pub content: String,
    /// Key-value metadata (`source`, `parent_id`, `kind`, `is_scan`, `page`, ...).
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Document {
    /// Create a document with the given content and empty metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), metadata: HashMap::new() }
    }

    /// Return a copy of this document with `key` set to `value`.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Return a copy of this document with its `source` set.
    pub fn with_source(self, source: impl Into<String>) -> Self {
        self.with_metadata(SOURCE_KEY, source.into())
    }

    /// The string value stored under `key`, if present and a string.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// The source identifier, if present.
    pub fn source(&self) -> Option<&str> {
        self.metadata_str(SOURCE_KEY)
    }

    /// The source identifier, or [`UNKNOWN_SOURCE`].
    pub fn source_or_unknown(&self) -> &str {
        self.source().unwrap_or(UNKNOWN_SOURCE)
    }

    /// The parent id stored under `key`, ignoring empty strings.
    pub fn parent_id(&self, key: &str) -> Option<&str> {
        self.metadata_str(key).filter(|id| !id.is_empty())
    }

    /// Length of the content in characters.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// A [`Document`] paired with the distance reported by the vector index.
///
/// Lower is more similar; `0.0` is an exact match. After reranking the
/// distances in a result list are not necessarily ascending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredDocument {
    /// The retrieved document.
    pub document: Document,
    /// The original index distance.
    pub distance: f64,
}

impl ScoredDocument {
    pub fn new(document: Document, distance: f64) -> Self {
        Self { document, distance }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_falls_back_to_unknown() {
        let doc = Document::new("text");
        assert_eq!(doc.source(), None);
        assert_eq!(doc.source_or_unknown(), UNKNOWN_SOURCE);

        let doc = doc.with_source("manual.pdf");
        assert_eq!(doc.source(), Some("manual.pdf"));
    }

    #[test]
    fn parent_id_ignores_empty_and_non_string_values() {
        let doc = Document::new("x").with_metadata("doc_id", "");
        assert_eq!(doc.parent_id("doc_id"), None);

        let doc = Document::new("x").with_metadata("doc_id", 7);
        assert_eq!(doc.parent_id("doc_id"), None);

        let doc = Document::new("x").with_metadata("doc_id", "p-1");
        assert_eq!(doc.parent_id("doc_id"), Some("p-1"));
    }

    #[test]
    fn char_len_counts_characters_not_bytes() {
        assert_eq!(Document::new("문서").char_len(), 2);
    }
}

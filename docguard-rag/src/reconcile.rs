//! Mapping reranked documents back to their index distances.
//!
//! Rerankers may hand back fresh document records, so distances are looked up
//! by a key derived from `(source, content prefix)` instead of by reference.

use std::collections::HashMap;

use crate::document::{Document, ScoredDocument};

/// Distance assigned to a reranked document that cannot be matched to any
/// candidate. Large enough to fail every guardrail threshold.
pub const UNMATCHED_DISTANCE: f64 = 999.0;

/// Content-derived identity of a document: its source plus the first
/// `prefix_chars` characters of its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocKey(String);

impl DocKey {
    /// Derive the key for `doc`.
    pub fn of(doc: &Document, prefix_chars: usize) -> Self {
        let prefix: String = doc.content.chars().take(prefix_chars).collect();
        Self(format!("{}::{prefix}", doc.source_or_unknown()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Distances of the index candidates, keyed by [`DocKey`].
///
/// When two candidates share a key, the smaller distance is kept.
#[derive(Debug, Clone, Default)]
pub struct DistanceMap {
    prefix_chars: usize,
    distances: HashMap<DocKey, f64>,
}

impl DistanceMap {
    /// Build the map from index candidates.
    pub fn from_candidates(candidates: &[ScoredDocument], prefix_chars: usize) -> Self {
        let mut distances: HashMap<DocKey, f64> = HashMap::with_capacity(candidates.len());
        for candidate in candidates {
            distances
                .entry(DocKey::of(&candidate.document, prefix_chars))
                .and_modify(|d| *d = d.min(candidate.distance))
                .or_insert(candidate.distance);
        }
        Self { prefix_chars, distances }
    }

    /// The original distance of `doc`, if it matches a candidate.
    pub fn get(&self, doc: &Document) -> Option<f64> {
        self.distances.get(&DocKey::of(doc, self.prefix_chars)).copied()
    }

    /// The original distance of `doc`, or [`UNMATCHED_DISTANCE`].
    pub fn resolve(&self, doc: &Document) -> f64 {
        self.get(doc).unwrap_or(UNMATCHED_DISTANCE)
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

/// Best child distance per parent id, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ParentHits {
    order: Vec<String>,
    best: HashMap<String, ParentHit>,
}

/// What the pipeline remembers about one parent while walking its children.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentHit {
    /// Smallest distance among this parent's children seen so far.
    pub distance: f64,
    /// Source of the first child that referenced this parent.
    pub first_child_source: Option<String>,
}

impl ParentHits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a child hit for `parent_id`.
    ///
    /// The first call for a parent fixes its position and its fallback source;
    /// later calls can only lower its distance.
    pub fn record(&mut self, parent_id: &str, distance: f64, child_source: Option<&str>) {
        match self.best.get_mut(parent_id) {
            Some(hit) => hit.distance = hit.distance.min(distance),
            None => {
                self.order.push(parent_id.to_string());
                self.best.insert(
                    parent_id.to_string(),
                    ParentHit {
                        distance,
                        first_child_source: child_source.map(str::to_string),
                    },
                );
            }
        }
    }

    /// Parent ids in first-seen order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn get(&self, parent_id: &str) -> Option<&ParentHit> {
        self.best.get(parent_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_source_and_char_prefix() {
        let doc = Document::new("가나다라마").with_source("a.pdf");
        assert_eq!(DocKey::of(&doc, 3).as_str(), "a.pdf::가나다");

        let unsourced = Document::new("abc");
        assert_eq!(DocKey::of(&unsourced, 10).as_str(), "unknown::abc");
    }

    #[test]
    fn documents_differing_after_prefix_share_a_key() {
        let a = Document::new("same prefix, tail one").with_source("s");
        let b = Document::new("same prefix, tail two").with_source("s");
        assert_eq!(DocKey::of(&a, 11), DocKey::of(&b, 11));
        assert_ne!(DocKey::of(&a, 200), DocKey::of(&b, 200));
    }

    #[test]
    fn distance_map_resolves_rebuilt_documents() {
        let candidates = vec![
            ScoredDocument::new(Document::new("alpha").with_source("a"), 0.12),
            ScoredDocument::new(Document::new("beta").with_source("b"), 0.31),
        ];
        let map = DistanceMap::from_candidates(&candidates, 200);

        // A structurally equal but separately built record still matches.
        let rebuilt = Document::new("beta").with_source("b").with_metadata("relevance", 0.9);
        assert_eq!(map.resolve(&rebuilt), 0.31);

        let stranger = Document::new("gamma").with_source("c");
        assert_eq!(map.get(&stranger), None);
        assert_eq!(map.resolve(&stranger), UNMATCHED_DISTANCE);
    }

    #[test]
    fn colliding_keys_keep_smaller_distance() {
        let candidates = vec![
            ScoredDocument::new(Document::new("dup").with_source("s"), 0.4),
            ScoredDocument::new(Document::new("dup").with_source("s"), 0.2),
        ];
        let map = DistanceMap::from_candidates(&candidates, 200);
        assert_eq!(map.len(), 1);
        assert_eq!(map.resolve(&Document::new("dup").with_source("s")), 0.2);
    }

    #[test]
    fn parent_hits_keep_first_seen_order_and_min_distance() {
        let mut hits = ParentHits::new();
        hits.record("p2", 0.30, Some("child-a"));
        hits.record("p1", 0.10, Some("child-b"));
        hits.record("p2", 0.05, Some("child-c"));
        hits.record("p1", 0.50, Some("child-d"));

        assert_eq!(hits.ids(), &["p2".to_string(), "p1".to_string()]);
        let p2 = hits.get("p2").unwrap();
        assert_eq!(p2.distance, 0.05);
        assert_eq!(p2.first_child_source.as_deref(), Some("child-a"));
        let p1 = hits.get("p1").unwrap();
        assert_eq!(p1.distance, 0.10);
        assert_eq!(p1.first_child_source.as_deref(), Some("child-b"));
        assert_eq!(hits.len(), 2);
    }
}

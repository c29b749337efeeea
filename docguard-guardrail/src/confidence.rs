//! Confidence scoring from retrieval distances.
//!
//! The score blends two signals:
//! - how close the top result is, mapped piecewise-linearly onto `[0, 1]`
//! - how many results are individually good, as a small step bonus
//!
//! The sum is capped at 1.0 and bucketed into [`ConfidenceLevel`].

use serde::{Deserialize, Serialize};

use docguard_rag::ScoredDocument;

use crate::config::ConfidenceConfig;
use crate::error::Result;

/// Discrete confidence bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

/// Outcome of a confidence calculation. Derived per request, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceResult {
    pub level: ConfidenceLevel,
    /// Final score in `[0, 1]`: `min(base + bonus, 1.0)`.
    pub score: f64,
    /// Normalized top distance.
    pub base: f64,
    /// Good-hit bonus.
    pub bonus: f64,
}

/// Converts distances into a bounded confidence score.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceEngine {
    config: ConfidenceConfig,
}

impl ConfidenceEngine {
    /// Create an engine, validating the thresholds.
    pub fn new(config: ConfidenceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ConfidenceConfig {
        &self.config
    }

    /// Map a distance onto `[0, 1]`, non-increasing in `distance`.
    ///
    /// NaN is treated as the worst possible distance.
    pub fn normalize(&self, distance: f64) -> f64 {
        let ConfidenceConfig { score_min, score_max, .. } = self.config;
        if distance.is_nan() || distance >= score_max {
            return 0.0;
        }
        if distance <= score_min {
            return 1.0;
        }
        (1.0 - (distance - score_min) / (score_max - score_min)).clamp(0.0, 1.0)
    }

    /// Step bonus for the number of good hits, capped at 0.15.
    pub fn hits_bonus(good_hits: usize) -> f64 {
        match good_hits {
            0 => 0.0,
            1 => 0.05,
            2 => 0.10,
            _ => 0.15,
        }
    }

    /// Whether `distance` counts as a good hit.
    pub fn is_good_hit(&self, distance: f64) -> bool {
        distance <= self.config.good_hit_max
    }

    /// Number of good hits in `results`.
    pub fn count_good_hits(&self, results: &[ScoredDocument]) -> usize {
        results.iter().filter(|r| self.is_good_hit(r.distance)).count()
    }

    /// Combine the top distance and good-hit count into a [`ConfidenceResult`].
    pub fn calculate(&self, top_distance: f64, good_hits: usize) -> ConfidenceResult {
        let base = self.normalize(top_distance);
        let bonus = Self::hits_bonus(good_hits);
        let score = (base + bonus).min(1.0);

        let level = if score >= self.config.high_cutoff {
            ConfidenceLevel::High
        } else if score >= self.config.medium_cutoff {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        };

        ConfidenceResult { level, score, base, bonus }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ConfidenceEngine {
        ConfidenceEngine::default()
    }

    #[test]
    fn normalize_clamps_at_thresholds() {
        let e = engine();
        assert_eq!(e.normalize(0.0), 1.0);
        assert_eq!(e.normalize(0.10), 1.0);
        assert_eq!(e.normalize(0.50), 0.0);
        assert_eq!(e.normalize(5.0), 0.0);
        assert_eq!(e.normalize(f64::NAN), 0.0);
    }

    #[test]
    fn normalize_interpolates_linearly() {
        let e = engine();
        assert!((e.normalize(0.30) - 0.5).abs() < 1e-12);
        assert!((e.normalize(0.20) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn bonus_steps() {
        assert_eq!(ConfidenceEngine::hits_bonus(0), 0.0);
        assert_eq!(ConfidenceEngine::hits_bonus(1), 0.05);
        assert_eq!(ConfidenceEngine::hits_bonus(2), 0.10);
        assert_eq!(ConfidenceEngine::hits_bonus(3), 0.15);
        assert_eq!(ConfidenceEngine::hits_bonus(40), 0.15);
    }

    #[test]
    fn calculate_caps_score_and_assigns_levels() {
        let e = engine();

        let top = e.calculate(0.05, 3);
        assert_eq!(top.score, 1.0);
        assert_eq!(top.bonus, 0.15);
        assert_eq!(top.level, ConfidenceLevel::High);

        // base 0.5, bonus 0.05
        let mid = e.calculate(0.30, 1);
        assert!((mid.score - 0.55).abs() < 1e-12);
        assert_eq!(mid.level, ConfidenceLevel::Medium);

        let low = e.calculate(0.45, 0);
        assert!(low.score < 0.5);
        assert_eq!(low.level, ConfidenceLevel::Low);
    }

    #[test]
    fn good_hits_are_inclusive_of_threshold() {
        let e = engine();
        assert!(e.is_good_hit(0.15));
        assert!(!e.is_good_hit(0.1500001));
    }

    #[test]
    fn serializes_level_in_snake_case() {
        let json = serde_json::to_value(engine().calculate(0.1, 2)).unwrap();
        assert_eq!(json["level"], "high");
        assert_eq!(json["bonus"], 0.10);
    }
}

//! Threshold configuration for confidence scoring and guardrails.

use serde::{Deserialize, Serialize};

use crate::error::{GuardrailError, Result};

/// Thresholds used by [`ConfidenceEngine`](crate::ConfidenceEngine).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Distances at or below this map to full confidence.
    pub score_min: f64,
    /// Distances at or above this map to zero confidence.
    pub score_max: f64,
    /// Distances at or below this count as good hits.
    pub good_hit_max: f64,
    /// Scores at or above this are `high`.
    pub high_cutoff: f64,
    /// Scores at or above this (and below `high_cutoff`) are `medium`.
    pub medium_cutoff: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            score_min: 0.10,
            score_max: 0.50,
            good_hit_max: 0.15,
            high_cutoff: 0.75,
            medium_cutoff: 0.50,
        }
    }
}

impl ConfidenceConfig {
    pub fn builder() -> ConfidenceConfigBuilder {
        ConfidenceConfigBuilder::default()
    }

    /// # Errors
    ///
    /// Returns [`GuardrailError::Config`] if:
    /// - any threshold is not finite
    /// - `score_min >= score_max`
    /// - a level cutoff is outside `[0, 1]` or `medium_cutoff > high_cutoff`
    pub fn validate(&self) -> Result<()> {
        let values =
            [self.score_min, self.score_max, self.good_hit_max, self.high_cutoff, self.medium_cutoff];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GuardrailError::Config("confidence thresholds must be finite".to_string()));
        }
        if self.score_min >= self.score_max {
            return Err(GuardrailError::Config(format!(
                "score_min ({}) must be less than score_max ({})",
                self.score_min, self.score_max
            )));
        }
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.high_cutoff) || !in_unit(self.medium_cutoff) {
            return Err(GuardrailError::Config("level cutoffs must lie in [0, 1]".to_string()));
        }
        if self.medium_cutoff > self.high_cutoff {
            return Err(GuardrailError::Config(format!(
                "medium_cutoff ({}) must not exceed high_cutoff ({})",
                self.medium_cutoff, self.high_cutoff
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfidenceConfigBuilder {
    config: ConfidenceConfig,
}

impl ConfidenceConfigBuilder {
    pub fn score_range(mut self, min: f64, max: f64) -> Self {
        self.config.score_min = min;
        self.config.score_max = max;
        self
    }

    pub fn good_hit_max(mut self, distance: f64) -> Self {
        self.config.good_hit_max = distance;
        self
    }

    pub fn level_cutoffs(mut self, medium: f64, high: f64) -> Self {
        self.config.medium_cutoff = medium;
        self.config.high_cutoff = high;
        self
    }

    pub fn build(self) -> Result<ConfidenceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Thresholds used by [`GuardrailPolicy`](crate::GuardrailPolicy).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuardrailConfig {
    /// Refuse when the top result's distance exceeds this.
    pub top_score_max: f64,
    /// Minimum number of good hits, unless a long document is present.
    pub min_good_hits: usize,
    /// A single result with more characters than this is enough context on its own.
    pub long_context_chars: usize,
    /// Commands with `low` confidence below this score are refused.
    pub command_min_score: f64,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self { top_score_max: 0.35, min_good_hits: 2, long_context_chars: 300, command_min_score: 0.5 }
    }
}

impl GuardrailConfig {
    pub fn builder() -> GuardrailConfigBuilder {
        GuardrailConfigBuilder::default()
    }

    /// # Errors
    ///
    /// Returns [`GuardrailError::Config`] if `top_score_max` is not finite or
    /// `command_min_score` lies outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !self.top_score_max.is_finite() {
            return Err(GuardrailError::Config("top_score_max must be finite".to_string()));
        }
        if !(0.0..=1.0).contains(&self.command_min_score) {
            return Err(GuardrailError::Config(format!(
                "command_min_score ({}) must lie in [0, 1]",
                self.command_min_score
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GuardrailConfigBuilder {
    config: GuardrailConfig,
}

impl GuardrailConfigBuilder {
    pub fn top_score_max(mut self, distance: f64) -> Self {
        self.config.top_score_max = distance;
        self
    }

    pub fn min_good_hits(mut self, count: usize) -> Self {
        self.config.min_good_hits = count;
        self
    }

    pub fn long_context_chars(mut self, chars: usize) -> Self {
        self.config.long_context_chars = chars;
        self
    }

    pub fn command_min_score(mut self, score: f64) -> Self {
        self.config.command_min_score = score;
        self
    }

    pub fn build(self) -> Result<GuardrailConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

//! Evidence guardrail deciding whether retrieved results are good enough to
//! answer from or act on.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use docguard_rag::ScoredDocument;

use crate::confidence::{ConfidenceEngine, ConfidenceLevel, ConfidenceResult};
use crate::config::GuardrailConfig;
use crate::error::Result;

/// Why a request was allowed or refused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GuardReason {
    Ok,
    NoResults,
    LowConfidence,
    InsufficientGoodHits,
    ParseFailed,
    CommandNotAllowed,
}

impl GuardReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardReason::Ok => "ok",
            GuardReason::NoResults => "no_results",
            GuardReason::LowConfidence => "low_confidence",
            GuardReason::InsufficientGoodHits => "insufficient_good_hits",
            GuardReason::ParseFailed => "parse_failed",
            GuardReason::CommandNotAllowed => "command_not_allowed",
        }
    }
}

impl std::fmt::Display for GuardReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary statistics over a non-empty result list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvidenceSummary {
    /// Distance of the first (most relevant) result.
    pub top_distance: f64,
    pub good_hits: usize,
    pub confidence: ConfidenceResult,
}

/// The guardrail verdict for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardDecision {
    pub reason: GuardReason,
    /// `None` only when there were no results.
    pub summary: Option<EvidenceSummary>,
}

impl GuardDecision {
    pub fn is_ok(&self) -> bool {
        self.reason == GuardReason::Ok
    }

    pub fn confidence(&self) -> Option<ConfidenceResult> {
        self.summary.map(|s| s.confidence)
    }

    pub fn top_distance(&self) -> Option<f64> {
        self.summary.map(|s| s.top_distance)
    }

    pub fn good_hits(&self) -> Option<usize> {
        self.summary.map(|s| s.good_hits)
    }
}

/// Applies the guardrail chain to retrieval results.
///
/// Conditions are checked in order and the first match wins:
/// `no_results`, `low_confidence`, `insufficient_good_hits`, then `ok`.
#[derive(Debug, Clone, Default)]
pub struct GuardrailPolicy {
    engine: ConfidenceEngine,
    config: GuardrailConfig,
}

impl GuardrailPolicy {
    pub fn new(engine: ConfidenceEngine, config: GuardrailConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { engine, config })
    }

    pub fn engine(&self) -> &ConfidenceEngine {
        &self.engine
    }

    pub fn config(&self) -> &GuardrailConfig {
        &self.config
    }

    /// Compute the top distance, good-hit count and confidence.
    ///
    /// Returns `None` for an empty list without touching the engine.
    pub fn summarize(&self, results: &[ScoredDocument]) -> Option<EvidenceSummary> {
        let top_distance = results.first()?.distance;
        let good_hits = self.engine.count_good_hits(results);
        let confidence = self.engine.calculate(top_distance, good_hits);
        Some(EvidenceSummary { top_distance, good_hits, confidence })
    }

    /// Evaluate the base guardrail chain.
    pub fn evaluate(&self, results: &[ScoredDocument]) -> GuardDecision {
        let Some(summary) = self.summarize(results) else {
            info!(reason = %GuardReason::NoResults, "guardrail refused");
            return GuardDecision { reason: GuardReason::NoResults, summary: None };
        };

        let reason = if summary.top_distance > self.config.top_score_max {
            GuardReason::LowConfidence
        } else if summary.good_hits < self.config.min_good_hits && !self.has_long_context(results)
        {
            GuardReason::InsufficientGoodHits
        } else {
            GuardReason::Ok
        };

        info!(
            reason = %reason,
            top_distance = summary.top_distance,
            good_hits = summary.good_hits,
            score = summary.confidence.score,
            "guardrail evaluated"
        );
        GuardDecision { reason, summary: Some(summary) }
    }

    /// Evaluate the base chain, then the stricter command gate.
    ///
    /// A base `ok` that fails the command gate becomes `low_confidence`.
    pub fn evaluate_command(&self, results: &[ScoredDocument]) -> GuardDecision {
        let decision = self.evaluate(results);
        match decision.summary {
            Some(summary) if decision.is_ok() && !self.command_gate(&summary.confidence) => {
                info!(score = summary.confidence.score, "command gate refused");
                GuardDecision { reason: GuardReason::LowConfidence, summary: Some(summary) }
            }
            _ => decision,
        }
    }

    /// Whether a command may proceed at this confidence.
    ///
    /// Refuses only when the level is `low` and the score is below
    /// `command_min_score`.
    pub fn command_gate(&self, confidence: &ConfidenceResult) -> bool {
        !(confidence.level == ConfidenceLevel::Low
            && confidence.score < self.config.command_min_score)
    }

    fn has_long_context(&self, results: &[ScoredDocument]) -> bool {
        let long = results.iter().any(|r| r.document.char_len() > self.config.long_context_chars);
        if long {
            debug!(threshold = self.config.long_context_chars, "long document present");
        }
        long
    }
}

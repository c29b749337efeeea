//! Transport-agnostic request and response shapes.

use serde::{Deserialize, Serialize};

use docguard_guardrail::{CommandAction, ConfidenceResult, GuardDecision, GuardReason};
use docguard_rag::ScoredDocument;

use crate::context::prefix_chars;
use crate::intent::IntentResult;

/// Which flow handles a request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Answer,
    Command,
    /// Classify the intent first, then route.
    Auto,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request {
    pub question: String,
    #[serde(default)]
    pub mode: Mode,
}

impl Request {
    pub fn new(question: impl Into<String>, mode: Mode) -> Self {
        Self { question: question.into(), mode }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    RagAnswer,
    Command,
}

/// A cited source: where it came from, its distance and a short preview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    pub source: Option<String>,
    pub score: f64,
    pub preview: String,
}

impl SourceRef {
    pub fn from_result(result: &ScoredDocument, preview_chars: usize) -> Self {
        Self {
            source: result.document.source().map(str::to_string),
            score: result.distance,
            preview: prefix_chars(&result.document.content, preview_chars).to_string(),
        }
    }
}

/// Guard outcome attached to every response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuardReport {
    pub reason: GuardReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub good_hits: Option<usize>,
    /// Diagnostic detail, such as the rejected command or argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl GuardReport {
    pub fn from_decision(decision: &GuardDecision) -> Self {
        Self {
            reason: decision.reason,
            top_score: decision.top_distance(),
            good_hits: decision.good_hits(),
            detail: None,
        }
    }

    /// Same statistics, different reason.
    pub fn with_reason(mut self, reason: GuardReason) -> Self {
        self.reason = reason;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// The result of one request.
///
/// Answers carry `answer`; commands carry `speech` and `actions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    #[serde(rename = "type")]
    pub kind: ResponseType,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<CommandAction>>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
    pub guard: GuardReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<ConfidenceResult>,
    /// Set in auto mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<IntentResult>,
    /// Unparsable model output, set on `parse_failed` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl Response {
    pub(crate) fn answer(
        question: &str,
        answer: impl Into<String>,
        sources: Vec<SourceRef>,
        guard: GuardReport,
        confidence: Option<ConfidenceResult>,
    ) -> Self {
        Self {
            kind: ResponseType::RagAnswer,
            question: question.to_string(),
            answer: Some(answer.into()),
            speech: None,
            actions: None,
            sources,
            guard,
            confidence,
            intent: None,
            raw: None,
        }
    }

    pub(crate) fn command(
        question: &str,
        speech: impl Into<String>,
        actions: Vec<CommandAction>,
        sources: Vec<SourceRef>,
        guard: GuardReport,
        confidence: Option<ConfidenceResult>,
    ) -> Self {
        Self {
            kind: ResponseType::Command,
            question: question.to_string(),
            answer: None,
            speech: Some(speech.into()),
            actions: Some(actions),
            sources,
            guard,
            confidence,
            intent: None,
            raw: None,
        }
    }

    /// Whether the guardrail let the request through.
    pub fn is_ok(&self) -> bool {
        self.guard.reason == GuardReason::Ok
    }
}

//! Routing of free-form input to the answer or command flow.
//!
//! A cheap rule stage runs first; only inputs no rule recognizes are sent to
//! the language model.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AssistantError, Result};
use crate::model::LanguageModel;
use crate::prompt::{INTENT_TEMPLATE, PromptVars, render};

/// What the user wants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Command,
    Explain,
}

/// A classification and the rule or stage that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntentResult {
    pub intent: Intent,
    pub reason: String,
}

impl IntentResult {
    fn new(intent: Intent, reason: impl Into<String>) -> Self {
        Self { intent, reason: reason.into() }
    }
}

const DEFAULT_COMMAND_HINTS: &[&str] = &[
    r"^(please\s+)?(open|close|play|stop|pause|save|copy|navigate|switch|change|set|turn|run|launch|show|search)\b",
    r"\b(can|could|would) you\s+(please\s+)?(open|close|play|save|copy|navigate|switch|change|set|turn|run|launch|show|search)\b",
    r"\bgo to\b",
    r"\bturn (on|off)\b",
    r"\bremind me\b",
];

const DEFAULT_EXPLAIN_HINTS: &[&str] = &[
    r"\bwhat\b",
    r"\bwhy\b",
    r"\bhow\b",
    r"\bexplain\b",
    r"\bdifference\b",
    r"\bdefin(e|ition)\b",
    r"\bmeaning\b",
    r"\bconcept\b",
];

/// Hybrid intent classifier.
///
/// Command hints are checked before explain hints. Input of two characters or
/// fewer is always `explain`.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    command_hints: Vec<Regex>,
    explain_hints: Vec<Regex>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self {
            command_hints: compile_all(DEFAULT_COMMAND_HINTS)
                .expect("unreachable error: failed to compile default command hints"),
            explain_hints: compile_all(DEFAULT_EXPLAIN_HINTS)
                .expect("unreachable error: failed to compile default explain hints"),
        }
    }
}

impl IntentClassifier {
    /// Build a classifier from custom hint patterns (matched case-insensitively).
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Config`] if a pattern does not compile.
    pub fn new<S: AsRef<str>>(command_hints: &[S], explain_hints: &[S]) -> Result<Self> {
        Ok(Self {
            command_hints: compile_all(command_hints)?,
            explain_hints: compile_all(explain_hints)?,
        })
    }

    /// The rule stage alone. `None` means no rule matched.
    pub fn classify_by_rules(&self, question: &str) -> Option<IntentResult> {
        let q = question.trim();
        if q.chars().count() <= 2 {
            return Some(IntentResult::new(Intent::Explain, "too_short"));
        }
        if let Some(hint) = self.command_hints.iter().find(|re| re.is_match(q)) {
            return Some(IntentResult::new(Intent::Command, format!("rule_match:{}", hint.as_str())));
        }
        if let Some(hint) = self.explain_hints.iter().find(|re| re.is_match(q)) {
            return Some(IntentResult::new(Intent::Explain, format!("rule_match:{}", hint.as_str())));
        }
        None
    }

    /// Rules first, then the model. An unparsable model reply is `explain`.
    ///
    /// # Errors
    ///
    /// Propagates a failed model call.
    pub async fn classify(&self, question: &str, model: &dyn LanguageModel) -> Result<IntentResult> {
        if let Some(result) = self.classify_by_rules(question) {
            debug!(intent = ?result.intent, reason = %result.reason, "intent from rules");
            return Ok(result);
        }

        let prompt = render(INTENT_TEMPLATE, &PromptVars { question, ..Default::default() });
        let raw = crate::model::generate(model, &prompt).await?;
        match serde_json::from_str::<IntentResult>(raw.trim()) {
            Ok(result) => {
                debug!(intent = ?result.intent, reason = %result.reason, "intent from model");
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, model = model.name(), "unparsable intent reply");
                Ok(IntentResult::new(Intent::Explain, "llm_parse_failed"))
            }
        }
    }
}

fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p.as_ref())
                .case_insensitive(true)
                .build()
                .map_err(|e| AssistantError::Config(format!("invalid intent hint {:?}: {e}", p.as_ref())))
        })
        .collect()
}

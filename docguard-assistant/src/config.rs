//! Assistant configuration and its environment overrides.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use docguard_guardrail::{ConfidenceConfig, GuardrailConfig};
use docguard_rag::RetrievalConfig;

use crate::error::{AssistantError, Result};

/// Prefix of every environment variable read by [`AssistantConfig::from_env`].
pub const ENV_PREFIX: &str = "DOCGUARD_";

/// Limits applied when turning retrieved documents into prompt context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContextConfig {
    /// Per-document cut before a block is formatted.
    pub max_chars_per_doc: usize,
    /// Budget for the formatted blocks.
    pub max_context_chars: usize,
    /// Final cap on the context placed in a prompt.
    pub max_prompt_context_chars: usize,
    /// Length of the content preview attached to each cited source.
    pub preview_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_chars_per_doc: 900,
            max_context_chars: 3500,
            max_prompt_context_chars: 12000,
            preview_chars: 180,
        }
    }
}

impl ContextConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_chars_per_doc == 0
            || self.max_context_chars == 0
            || self.max_prompt_context_chars == 0
        {
            return Err(AssistantError::Config("context limits must be greater than zero".into()));
        }
        Ok(())
    }
}

/// Everything needed to build an [`Assistant`](crate::Assistant).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssistantConfig {
    pub retrieval: RetrievalConfig,
    pub confidence: ConfidenceConfig,
    pub guardrail: GuardrailConfig,
    pub context: ContextConfig,
}

impl AssistantConfig {
    /// Load a `.env` file if present, then apply `DOCGUARD_*` overrides from
    /// the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Config`] for unparsable values or an invalid
    /// resulting configuration.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_vars(std::env::vars())
    }

    /// Apply `DOCGUARD_*` overrides from an explicit variable list.
    ///
    /// Unprefixed variables are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .collect();

        let mut config = Self::default();

        let retrieval = &mut config.retrieval;
        override_from(&vars, "INITIAL_K", &mut retrieval.initial_k)?;
        override_from(&vars, "TOP_K", &mut retrieval.top_k)?;
        override_from(&vars, "FETCH_MULTIPLIER", &mut retrieval.fetch_multiplier)?;
        override_from(&vars, "KEY_PREFIX_CHARS", &mut retrieval.key_prefix_chars)?;
        override_from(&vars, "PARENT_ID_KEY", &mut retrieval.parent_id_key)?;
        override_from(&vars, "RETRIEVAL_MODE", &mut retrieval.mode)?;

        let confidence = &mut config.confidence;
        override_from(&vars, "SCORE_MIN", &mut confidence.score_min)?;
        override_from(&vars, "SCORE_MAX", &mut confidence.score_max)?;
        override_from(&vars, "GOOD_HIT_MAX", &mut confidence.good_hit_max)?;
        override_from(&vars, "HIGH_CUTOFF", &mut confidence.high_cutoff)?;
        override_from(&vars, "MEDIUM_CUTOFF", &mut confidence.medium_cutoff)?;

        let guardrail = &mut config.guardrail;
        override_from(&vars, "TOP_SCORE_MAX", &mut guardrail.top_score_max)?;
        override_from(&vars, "MIN_GOOD_HITS", &mut guardrail.min_good_hits)?;
        override_from(&vars, "LONG_CONTEXT_CHARS", &mut guardrail.long_context_chars)?;
        override_from(&vars, "COMMAND_MIN_SCORE", &mut guardrail.command_min_score)?;

        let context = &mut config.context;
        override_from(&vars, "MAX_CHARS_PER_DOC", &mut context.max_chars_per_doc)?;
        override_from(&vars, "MAX_CONTEXT_CHARS", &mut context.max_context_chars)?;
        override_from(&vars, "MAX_PROMPT_CONTEXT_CHARS", &mut context.max_prompt_context_chars)?;
        override_from(&vars, "PREVIEW_CHARS", &mut context.preview_chars)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.retrieval.validate().map_err(|e| AssistantError::Config(e.to_string()))?;
        self.confidence.validate()?;
        self.guardrail.validate()?;
        self.context.validate()
    }
}

fn override_from<T>(vars: &HashMap<String, String>, name: &str, slot: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: Display,
{
    let key = format!("{ENV_PREFIX}{name}");
    if let Some(raw) = vars.get(&key) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|e| AssistantError::Config(format!("{key}={raw:?}: {e}")))?;
    }
    Ok(())
}

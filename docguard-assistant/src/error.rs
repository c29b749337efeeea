//! Error types for the `docguard-assistant` crate.

use docguard_guardrail::GuardrailError;
use docguard_rag::RagError;
use thiserror::Error;

/// Hard failures of a request.
///
/// Refusals (no evidence, low confidence, unparsable or disallowed commands)
/// are ordinary [`Response`](crate::Response) values, not errors.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Retrieval failed; the inner error names the dependency.
    #[error(transparent)]
    Retrieval(#[from] RagError),

    /// The language model call failed.
    #[error("Language model error ({provider}): {message}")]
    Model { provider: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AssistantError {
    /// Short name of the dependency this error is attributed to.
    pub fn dependency(&self) -> &'static str {
        match self {
            AssistantError::Retrieval(e) => e.dependency(),
            AssistantError::Model { .. } => "language_model",
            AssistantError::Config(_) => "config",
        }
    }
}

impl From<GuardrailError> for AssistantError {
    fn from(err: GuardrailError) -> Self {
        match err {
            GuardrailError::Config(message) => AssistantError::Config(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;

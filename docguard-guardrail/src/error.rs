use thiserror::Error;

/// Errors raised while configuring guardrails.
///
/// Rejections of evidence or commands are not errors; they are reported
/// through [`GuardReason`](crate::GuardReason) and
/// [`CommandRejection`](crate::CommandRejection).
#[derive(Debug, Error)]
pub enum GuardrailError {
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GuardrailError>;

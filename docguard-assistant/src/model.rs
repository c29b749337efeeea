use async_trait::async_trait;
use tracing::error;

use crate::error::{AssistantError, Result};

/// Text generation seam for the external language model.
///
/// Implementations report failures as
/// [`AssistantError::Model`](crate::AssistantError::Model).
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Provider name used in logs and errors.
    fn name(&self) -> &str {
        "language_model"
    }

    /// Generate a completion for a fully rendered prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Call `model`, logging a failure and attributing it to the model.
pub(crate) async fn generate(model: &dyn LanguageModel, prompt: &str) -> Result<String> {
    model.generate(prompt).await.map_err(|e| {
        error!(model = model.name(), error = %e, "language model call failed");
        match e {
            e @ AssistantError::Model { .. } => e,
            other => AssistantError::Model {
                provider: model.name().to_string(),
                message: other.to_string(),
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    #[async_trait]
    impl LanguageModel for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(AssistantError::Config("missing api key".into()))
        }
    }

    #[tokio::test]
    async fn foreign_errors_are_attributed_to_the_model() {
        let err = generate(&Broken, "hi").await.unwrap_err();
        assert_eq!(err.dependency(), "language_model");
        assert!(matches!(err, AssistantError::Model { ref provider, ref message }
            if provider == "broken" && message.contains("missing api key")));
    }
}

//! Request orchestration: retrieval, guardrails, generation and validation.
//!
//! # Example
//!
//! ```rust,ignore
//! use docguard_assistant::{Assistant, AssistantConfig, Mode, Request};
//!
//! let assistant = Assistant::builder()
//!     .config(AssistantConfig::from_env()?)
//!     .index(Arc::new(index))
//!     .parent_store(Arc::new(store))
//!     .model(Arc::new(model))
//!     .build()?;
//!
//! let response = assistant.handle(&Request::new("open the help page", Mode::Auto)).await?;
//! ```

use std::sync::Arc;

use tracing::{info, warn};

use docguard_guardrail::{
    CommandValidator, CommandWhitelist, ConfidenceEngine, GuardReason, GuardrailPolicy,
    parse_command_json,
};
use docguard_rag::{ParentStore, Reranker, RetrievalPipeline, ScoreIndex, ScoredDocument};

use crate::config::{AssistantConfig, ContextConfig};
use crate::context::{format_documents, trim_context};
use crate::error::{AssistantError, Result};
use crate::intent::{Intent, IntentClassifier};
use crate::model::{self, LanguageModel};
use crate::prompt::{
    ANSWER_TEMPLATE, COMMAND_TEMPLATE, INSUFFICIENT_EVIDENCE_ANSWER, NO_EVIDENCE_ANSWER,
    PromptVars, describe_commands, render,
};
use crate::response::{GuardReport, Mode, Request, Response, SourceRef};

pub const NO_COMMAND_SPEECH: &str = "No executable command was found.";
pub const LOW_CONFIDENCE_SPEECH: &str = "Not confident enough to execute a command.";
pub const PARSE_FAILED_SPEECH: &str = "Could not interpret the command.";
pub const NOT_ALLOWED_SPEECH: &str = "That command is not allowed.";

/// Evidence-gated question answering and command generation.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct Assistant {
    pipeline: RetrievalPipeline,
    policy: GuardrailPolicy,
    validator: CommandValidator,
    classifier: IntentClassifier,
    model: Arc<dyn LanguageModel>,
    context: ContextConfig,
    command_catalog: String,
}

impl Assistant {
    pub fn builder() -> AssistantBuilder {
        AssistantBuilder::default()
    }

    pub fn policy(&self) -> &GuardrailPolicy {
        &self.policy
    }

    pub fn pipeline(&self) -> &RetrievalPipeline {
        &self.pipeline
    }

    /// Dispatch on the request mode.
    pub async fn handle(&self, request: &Request) -> Result<Response> {
        match request.mode {
            Mode::Answer => self.answer(&request.question).await,
            Mode::Command => self.command(&request.question).await,
            Mode::Auto => self.ask(&request.question).await,
        }
    }

    /// Classify the intent, then run the matching flow.
    pub async fn ask(&self, question: &str) -> Result<Response> {
        let intent = self.classifier.classify(question, self.model.as_ref()).await?;
        info!(intent = ?intent.intent, reason = %intent.reason, "routing request");
        let mut response = match intent.intent {
            Intent::Command => self.command(question).await?,
            Intent::Explain => self.answer(question).await?,
        };
        response.intent = Some(intent);
        Ok(response)
    }

    /// Answer from retrieved documents, or refuse with a fixed sentence.
    pub async fn answer(&self, question: &str) -> Result<Response> {
        let results = self.pipeline.retrieve(question).await?;
        let decision = self.policy.evaluate(&results);
        let guard = GuardReport::from_decision(&decision);

        match decision.reason {
            GuardReason::NoResults => {
                return Ok(Response::answer(question, NO_EVIDENCE_ANSWER, Vec::new(), guard, None));
            }
            GuardReason::Ok => {}
            _ => {
                return Ok(Response::answer(
                    question,
                    INSUFFICIENT_EVIDENCE_ANSWER,
                    self.sources(&results),
                    guard,
                    decision.confidence(),
                ));
            }
        }

        let context = self.build_context(&results);
        let prompt =
            render(ANSWER_TEMPLATE, &PromptVars { context: &context, question, ..Default::default() });
        let answer = self.generate(&prompt).await?;

        Ok(Response::answer(question, answer, self.sources(&results), guard, decision.confidence()))
    }

    /// Produce a validated command, or refuse with an empty action list.
    pub async fn command(&self, question: &str) -> Result<Response> {
        let results = self.pipeline.retrieve(question).await?;
        let decision = self.policy.evaluate_command(&results);
        let guard = GuardReport::from_decision(&decision);
        let confidence = decision.confidence();

        match decision.reason {
            GuardReason::NoResults => {
                return Ok(Response::command(
                    question,
                    NO_COMMAND_SPEECH,
                    Vec::new(),
                    Vec::new(),
                    guard,
                    None,
                ));
            }
            GuardReason::Ok => {}
            _ => {
                return Ok(Response::command(
                    question,
                    LOW_CONFIDENCE_SPEECH,
                    Vec::new(),
                    self.sources(&results),
                    guard,
                    confidence,
                ));
            }
        }

        let context = self.build_context(&results);
        let prompt = render(
            COMMAND_TEMPLATE,
            &PromptVars { context: &context, question, commands: &self.command_catalog },
        );
        let raw = self.generate(&prompt).await?;
        let sources = self.sources(&results);

        let Some(parsed) = parse_command_json(&raw) else {
            warn!(raw_len = raw.len(), "model output is not a valid command");
            let mut response = Response::command(
                question,
                PARSE_FAILED_SPEECH,
                Vec::new(),
                sources,
                guard.with_reason(GuardReason::ParseFailed),
                confidence,
            );
            response.raw = Some(raw);
            return Ok(response);
        };

        if let Err(rejection) = self.validator.validate(&parsed) {
            return Ok(Response::command(
                question,
                NOT_ALLOWED_SPEECH,
                Vec::new(),
                sources,
                guard.with_reason(GuardReason::CommandNotAllowed).with_detail(rejection.to_string()),
                confidence,
            ));
        }

        info!(action_count = parsed.actions.len(), "command accepted");
        Ok(Response::command(question, parsed.speech, parsed.actions, sources, guard, confidence))
    }

    fn sources(&self, results: &[ScoredDocument]) -> Vec<SourceRef> {
        results.iter().map(|r| SourceRef::from_result(r, self.context.preview_chars)).collect()
    }

    fn build_context(&self, results: &[ScoredDocument]) -> String {
        let formatted = format_documents(results.iter().map(|r| &r.document), &self.context);
        trim_context(&formatted, self.context.max_prompt_context_chars).to_string()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        model::generate(self.model.as_ref(), prompt).await
    }
}

/// Builder for an [`Assistant`].
///
/// `index` and `model` are required. A `parent_store` is required when the
/// retrieval config selects parent promotion. The whitelist defaults to
/// [`CommandWhitelist::default`].
#[derive(Default)]
pub struct AssistantBuilder {
    config: Option<AssistantConfig>,
    index: Option<Arc<dyn ScoreIndex>>,
    reranker: Option<Arc<dyn Reranker>>,
    parent_store: Option<Arc<dyn ParentStore>>,
    model: Option<Arc<dyn LanguageModel>>,
    whitelist: Option<CommandWhitelist>,
    classifier: Option<IntentClassifier>,
}

impl AssistantBuilder {
    pub fn config(mut self, config: AssistantConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn index(mut self, index: Arc<dyn ScoreIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn parent_store(mut self, store: Arc<dyn ParentStore>) -> Self {
        self.parent_store = Some(store);
        self
    }

    pub fn model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn whitelist(mut self, whitelist: CommandWhitelist) -> Self {
        self.whitelist = Some(whitelist);
        self
    }

    pub fn classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// # Errors
    ///
    /// Returns [`AssistantError::Config`] for an invalid config or a missing
    /// required component.
    pub fn build(self) -> Result<Assistant> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let index = self.index.ok_or_else(|| AssistantError::Config("index is required".into()))?;
        let model = self.model.ok_or_else(|| AssistantError::Config("model is required".into()))?;

        let mut pipeline = RetrievalPipeline::builder().config(config.retrieval.clone()).index(index);
        if let Some(reranker) = self.reranker {
            pipeline = pipeline.reranker(reranker);
        }
        if let Some(store) = self.parent_store {
            pipeline = pipeline.parent_store(store);
        }
        let pipeline = pipeline.build().map_err(|e| AssistantError::Config(e.to_string()))?;

        let policy = GuardrailPolicy::new(ConfidenceEngine::new(config.confidence)?, config.guardrail)?;
        let validator = CommandValidator::new(self.whitelist.unwrap_or_default());
        let command_catalog = describe_commands(validator.whitelist());

        Ok(Assistant {
            pipeline,
            policy,
            validator,
            classifier: self.classifier.unwrap_or_default(),
            model,
            context: config.context,
            command_catalog,
        })
    }
}

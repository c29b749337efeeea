//! Evidence-gated assistant over a private document corpus.
//!
//! Each request is retrieved against the corpus, scored, and gated before the
//! language model is consulted:
//! - answers are refused when evidence is missing or weak
//! - commands additionally pass a stricter confidence gate, then schema
//!   parsing, then the command whitelist
//!
//! Retrieval, ranking, storage and generation are injected as trait objects,
//! so every collaborator can be replaced by an in-memory fake.

pub mod assistant;
pub mod config;
pub mod context;
pub mod error;
pub mod intent;
pub mod model;
pub mod prompt;
pub mod response;
pub mod telemetry;

pub use assistant::{Assistant, AssistantBuilder};
pub use config::{AssistantConfig, ContextConfig, ENV_PREFIX};
pub use context::{format_documents, trim_context};
pub use error::{AssistantError, Result};
pub use intent::{Intent, IntentClassifier, IntentResult};
pub use model::LanguageModel;
pub use response::{GuardReport, Mode, Request, Response, ResponseType, SourceRef};
pub use telemetry::init_tracing;

//! Decision layer for docguard.
//!
//! Turns retrieval distances into a bounded confidence score, decides whether
//! the evidence is strong enough to answer or act on, and checks parsed
//! commands against a whitelist of permitted capabilities.
//!
//! ```
//! use docguard_guardrail::{CommandAction, CommandResponse, CommandValidator};
//!
//! let validator = CommandValidator::default();
//! let command = CommandResponse::new("Opening.", vec![CommandAction::new("OpenUrl")]);
//! assert_eq!(validator.validate_reason(&command).1, "missing_argument: OpenUrl.url");
//! ```

pub mod command;
pub mod confidence;
pub mod config;
pub mod error;
pub mod policy;
pub mod validator;
pub mod whitelist;

pub use command::{CommandAction, CommandResponse, CommandType, parse_command_json};
pub use confidence::{ConfidenceEngine, ConfidenceLevel, ConfidenceResult};
pub use config::{
    ConfidenceConfig, ConfidenceConfigBuilder, GuardrailConfig, GuardrailConfigBuilder,
};
pub use error::{GuardrailError, Result};
pub use policy::{EvidenceSummary, GuardDecision, GuardReason, GuardrailPolicy};
pub use validator::{CommandRejection, CommandValidator};
pub use whitelist::CommandWhitelist;

//! Whitelist validation for parsed commands.

use tracing::{debug, warn};

use crate::command::CommandResponse;
use crate::whitelist::CommandWhitelist;

/// Why a command response was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandRejection {
    #[error("command_not_allowed: {command}")]
    CommandNotAllowed { command: String },

    #[error("missing_argument: {command}.{argument}")]
    MissingArgument { command: String, argument: String },
}

impl CommandRejection {
    pub fn command(&self) -> &str {
        match self {
            CommandRejection::CommandNotAllowed { command }
            | CommandRejection::MissingArgument { command, .. } => command,
        }
    }
}

/// Checks every action of a command response against a [`CommandWhitelist`].
#[derive(Debug, Clone, Default)]
pub struct CommandValidator {
    whitelist: CommandWhitelist,
}

impl CommandValidator {
    pub fn new(whitelist: CommandWhitelist) -> Self {
        Self { whitelist }
    }

    pub fn whitelist(&self) -> &CommandWhitelist {
        &self.whitelist
    }

    /// Validate all actions; the first invalid one rejects the whole response.
    ///
    /// Extra arguments beyond the required ones are allowed.
    pub fn validate(&self, response: &CommandResponse) -> Result<(), CommandRejection> {
        for action in &response.actions {
            let Some(required) = self.whitelist.required_args(&action.name) else {
                let rejection = CommandRejection::CommandNotAllowed { command: action.name.clone() };
                warn!(reason = %rejection, "command rejected");
                return Err(rejection);
            };
            if let Some(missing) = required.iter().find(|arg| !action.args.contains_key(*arg)) {
                let rejection = CommandRejection::MissingArgument {
                    command: action.name.clone(),
                    argument: missing.clone(),
                };
                warn!(reason = %rejection, "command rejected");
                return Err(rejection);
            }
        }
        debug!(action_count = response.actions.len(), "command validated");
        Ok(())
    }

    /// [`validate`](Self::validate) as an `(ok, reason)` pair, with `"ok"` on success.
    pub fn validate_reason(&self, response: &CommandResponse) -> (bool, String) {
        match self.validate(response) {
            Ok(()) => (true, "ok".to_string()),
            Err(rejection) => (false, rejection.to_string()),
        }
    }
}

//! Structured command output and its lenient text parser.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// The only accepted value of a command response's `type` field.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    #[default]
    Command,
}

/// One action to execute: a command name and its arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandAction {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl CommandAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), args: Map::new() }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// A model-produced command: a sentence for the user plus the actions to run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandResponse {
    #[serde(rename = "type", default)]
    pub kind: CommandType,
    pub speech: String,
    #[serde(default)]
    pub actions: Vec<CommandAction>,
}

impl CommandResponse {
    pub fn new(speech: impl Into<String>, actions: Vec<CommandAction>) -> Self {
        Self { kind: CommandType::Command, speech: speech.into(), actions }
    }
}

/// Parse model output into a [`CommandResponse`].
///
/// Accepts a bare JSON object or one wrapped in a fenced code block.
/// Returns `None` when neither form yields a value matching the schema.
pub fn parse_command_json(text: &str) -> Option<CommandResponse> {
    if let Ok(parsed) = serde_json::from_str(text.trim()) {
        return Some(parsed);
    }
    let fenced = extract_fenced_json(text)?;
    match serde_json::from_str(fenced) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!(error = %e, "fenced command block did not match schema");
            None
        }
    }
}

/// Body of the first fenced block, minus an optional `json` tag.
///
/// The fence may open and close on the same line as the body.
fn extract_fenced_json(text: &str) -> Option<&str> {
    let (_, opened) = text.split_once("```")?;
    let body = match opened.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &opened[4..],
        _ => opened,
    };
    let (inner, _) = body.split_once("```")?;
    let inner = inner.trim();
    (!inner.is_empty()).then_some(inner)
}

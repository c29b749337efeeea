//! Prompt templates for answering, command generation and intent routing.
//!
//! Templates use `{context}`, `{question}` and `{commands}` placeholders,
//! substituted in a single pass by [`render`] so text inserted for one
//! placeholder is never rescanned for another.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use docguard_guardrail::CommandWhitelist;

/// Fixed reply when the documents contain nothing relevant.
pub const NO_EVIDENCE_ANSWER: &str = "No supporting evidence was found in the documents.";

/// Fixed reply when evidence exists but is too weak to answer from.
pub const INSUFFICIENT_EVIDENCE_ANSWER: &str =
    "Not enough supporting evidence was found in the documents.";

pub const ANSWER_TEMPLATE: &str = "\
You are a question-answering system over a private document collection.
Use only the information in CONTEXT below.

Rules:
1) If CONTEXT contains information related to the question, summarize it to answer.
2) Only when CONTEXT has no relevant evidence at all, reply exactly: \"No supporting evidence was found in the documents.\"
3) End each key sentence with the DOC number it relies on, like (DOC 1).
4) Do not exaggerate, guess or invent. Prefer the documents' wording, explained naturally.

[CONTEXT]
{context}

[QUESTION]
{question}

[ANSWER]
";

pub const COMMAND_TEMPLATE: &str = "\
You convert a user request into an application command.
Use CONTEXT to understand what the application can do.

Respond with a single JSON object and nothing else:
{\"type\": \"command\", \"speech\": \"<one sentence for the user>\", \"actions\": [{\"name\": \"<command>\", \"args\": {}}]}

Only these commands exist, with their required arguments:
{commands}

If no command fits, return an empty \"actions\" list and explain why in \"speech\".

[CONTEXT]
{context}

[REQUEST]
{question}
";

pub const INTENT_TEMPLATE: &str = "\
Classify the user input.
If it asks for information or an explanation, the intent is explain.
If it asks to perform, change or operate something, the intent is command.
If unsure, use explain.

Respond with a single JSON object:
{\"intent\": \"command|explain\", \"reason\": \"<short reason>\"}

[USER_INPUT]
{question}
";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(context|question|commands)\}")
        .expect("unreachable error: failed to compile placeholder pattern")
});

/// Values substituted into a template. Missing values render as empty text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptVars<'a> {
    pub context: &'a str,
    pub question: &'a str,
    pub commands: &'a str,
}

/// Substitute placeholders in `template`.
pub fn render(template: &str, vars: &PromptVars<'_>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "context" => vars.context,
            "question" => vars.question,
            _ => vars.commands,
        })
        .into_owned()
}

/// One `- Name(arg, ...)` line per whitelisted command.
pub fn describe_commands(whitelist: &CommandWhitelist) -> String {
    whitelist
        .names()
        .map(|name| {
            let args = whitelist
                .required_args(name)
                .map(|args| args.iter().map(String::as_str).collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            format!("- {name}({args})")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

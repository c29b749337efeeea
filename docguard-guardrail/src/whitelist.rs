use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Table of permitted command names and the argument keys each one requires.
///
/// Optional arguments are not listed. Read-only once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CommandWhitelist {
    commands: BTreeMap<String, BTreeSet<String>>,
}

impl Default for CommandWhitelist {
    fn default() -> Self {
        Self::empty()
            .with_command("OpenUrl", ["url"])
            .with_command("ShowNotification", ["message"])
            .with_command("CopyToClipboard", ["text"])
            .with_command("SaveLocalNote", ["content"])
            .with_command("SearchLocalDocs", ["query"])
            .with_command("SetAppTheme", ["theme"])
            .with_command("PlaySound", ["soundId"])
            .with_command("Navigate", ["route"])
            .with_command("ConfirmAction", ["message"])
    }
}

impl CommandWhitelist {
    /// A whitelist that permits nothing.
    pub fn empty() -> Self {
        Self { commands: BTreeMap::new() }
    }

    /// Register `name` with its required arguments, replacing any earlier entry.
    pub fn with_command<I, S>(mut self, name: impl Into<String>, required_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.insert(name.into(), required_args.into_iter().map(Into::into).collect());
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Required argument keys for `name`, or `None` if it is not permitted.
    pub fn required_args(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.commands.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry() {
        let whitelist = CommandWhitelist::default();
        assert_eq!(whitelist.len(), 9);
        assert!(whitelist.required_args("PlaySound").unwrap().contains("soundId"));
        assert!(whitelist.required_args("DeleteEverything").is_none());
    }

    #[test]
    fn with_command_replaces_entry() {
        let whitelist = CommandWhitelist::empty()
            .with_command("Ping", ["host"])
            .with_command("Ping", Vec::<String>::new());
        assert!(whitelist.required_args("Ping").unwrap().is_empty());
        assert_eq!(whitelist.names().collect::<Vec<_>>(), vec!["Ping"]);
    }

    #[test]
    fn deserializes_from_plain_map() {
        let whitelist: CommandWhitelist =
            serde_json::from_str(r#"{"OpenUrl": ["url"], "Beep": []}"#).unwrap();
        assert!(whitelist.contains("Beep"));
        assert!(!whitelist.contains("Navigate"));
    }
}

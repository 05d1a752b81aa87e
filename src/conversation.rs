use serde::Serialize;
use serde_json::Value;

use crate::web::models::{ChatTurn, Role};

/// One element of the `messages` array sent upstream.
///
/// Client history is forwarded untouched: entries that parse as a plain
/// `{role, content}` turn are kept typed, anything else rides along as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    Turn(ChatTurn),
    Raw(Value),
}

impl Entry {
    fn from_history(value: &Value) -> Self {
        match serde_json::from_value::<ChatTurn>(value.clone()) {
            Ok(turn) => Entry::Turn(turn),
            Err(_) => Entry::Raw(value.clone()),
        }
    }
}

/// The full ordered list of turns for one completion call:
/// persona, then client history, then the new user message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Conversation(Vec<Entry>);

impl Conversation {
    pub fn assemble(persona: &str, history: Option<&Value>, message: impl Into<String>) -> Self {
        let history: &[Value] = match history {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        };

        let mut entries = Vec::with_capacity(history.len() + 2);
        entries.push(Entry::Turn(ChatTurn::system(persona)));
        entries.extend(history.iter().map(Entry::from_history));
        entries.push(Entry::Turn(ChatTurn::user(message)));

        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Turns taken from client history, excluding the persona and the new message.
    pub fn history(&self) -> &[Entry] {
        match self.0.len() {
            0..=2 => &[],
            n => &self.0[1..n - 1],
        }
    }

    /// Number of history entries claiming the system role.
    pub fn injected_system_turns(&self) -> usize {
        self.history()
            .iter()
            .filter(|entry| match entry {
                Entry::Turn(turn) => turn.role == Role::System,
                Entry::Raw(value) => value.get("role").and_then(Value::as_str) == Some("system"),
            })
            .count()
    }
}

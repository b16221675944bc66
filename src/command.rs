//! Commands and plans.
//!
//! A [`Command`] is a JSON object whose `do` key names the verb; every other
//! key is a verb-specific argument. A [`Plan`] is the ordered, non-empty list
//! of commands derived from one raw input.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the verb of a command.
pub const VERB_KEY: &str = "do";

/// One discrete command. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Command {
    fields: Map<String, Value>,
}

impl Command {
    /// Build a command with the given verb and no arguments.
    pub fn new(verb: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(VERB_KEY.to_string(), Value::String(verb.into()));
        Self { fields }
    }

    /// Builder method adding one argument.
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Wrap an already decoded JSON object.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Lower-cased verb, or `""` when `do` is missing or not a string.
    pub fn verb(&self) -> String {
        self.fields
            .get(VERB_KEY)
            .and_then(Value::as_str)
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_default()
    }

    /// Raw argument value.
    pub fn arg(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Argument as a string slice, if present and a JSON string.
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// All fields, verb included.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.fields.clone()))
    }
}

/// Ordered, non-empty sequence of commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Plan {
    commands: Vec<Command>,
}

impl Plan {
    /// Build a plan. Returns `None` for an empty list.
    pub fn new(commands: Vec<Command>) -> Option<Self> {
        if commands.is_empty() {
            None
        } else {
            Some(Self { commands })
        }
    }

    /// Plan made of exactly one command.
    pub fn single(command: Command) -> Self {
        Self {
            commands: vec![command],
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

//! Command plan parsing.
//!
//! Turns one raw input into a [`Plan`]. Structured JSON is tried first:
//!
//! ```text
//! {"plan": [{"do": "save_note", "text": "x"}, ...]}
//! [{"do": "save_note", "text": "x"}, ...]
//! {"do": "save_note", "text": "x"}
//! ```
//!
//! Anything else goes through the keyword heuristics in [`NlRules`]. The
//! parser never fails: every input yields at least one command.

pub mod rules;

use serde_json::Value;

use crate::command::{Command, Plan};

pub use rules::NlRules;

/// Key of the command list in the wrapped plan shape.
pub const PLAN_KEY: &str = "plan";

/// Parser from raw input text to a [`Plan`].
#[derive(Debug, Clone, Default)]
pub struct PlanParser {
    rules: NlRules,
}

impl PlanParser {
    pub fn new(rules: NlRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &NlRules {
        &self.rules
    }

    /// Parse `raw` into a non-empty plan.
    ///
    /// Blank input is not expected here; it still yields a single fallback
    /// command with empty text.
    pub fn parse(&self, raw: &str) -> Plan {
        match self.parse_structured(raw) {
            Some(plan) => plan,
            None => Plan::single(self.rules.interpret(raw.trim())),
        }
    }

    /// Structured decoding. `None` means "not a plan, use the heuristics".
    fn parse_structured(&self, raw: &str) -> Option<Plan> {
        let value: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(e) => {
                log::trace!("Input is not JSON ({}), using keyword rules", e);
                return None;
            }
        };

        let commands = match value {
            Value::Object(mut map) => {
                if matches!(map.get(PLAN_KEY), Some(Value::Array(_))) {
                    match map.remove(PLAN_KEY) {
                        Some(Value::Array(items)) => commands_from(items),
                        _ => Vec::new(),
                    }
                } else {
                    vec![Command::from_map(map)]
                }
            }
            Value::Array(items) => commands_from(items),
            other => {
                log::trace!("JSON scalar {} is not a plan shape", other);
                return None;
            }
        };

        let plan = Plan::new(commands);
        if plan.is_none() {
            log::debug!("Structured input held no command objects; using keyword rules");
        }
        plan
    }
}

/// Keep object elements as commands, skip everything else.
fn commands_from(items: Vec<Value>) -> Vec<Command> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Value::Object(map) => Some(Command::from_map(map)),
            other => {
                log::debug!("Skipping plan element {}: not an object ({})", index, other);
                None
            }
        })
        .collect()
}

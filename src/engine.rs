//! Script engine: parse → resolve → execute → collect.
//!
//! [`ScriptEngine::run`] is the only error boundary of the core. Whatever
//! happens while interpreting one input ends up as an entry in the returned
//! [`ExecutionReport`]; nothing escapes as an `Err` or a panic from a skill
//! error.
//!
//! Commands run strictly one after the other. A skill is awaited to
//! completion before the next command is looked at, so plans such as
//! "save a note, then read the notes" observe their own effects.

use std::sync::Arc;

use serde::Serialize;

use crate::command::{Command, Plan};
use crate::parser::PlanParser;
use crate::skills::SkillRegistry;

/// Report text for blank input.
pub const NO_INPUT: &str = "no input";
/// Report text for a skill that succeeded without output.
pub const OK: &str = "OK";

/// How a single command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    NoHandler,
    Failed,
    NoInput,
}

/// One line of an execution report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    /// Verb of the command, `""` for the no-input entry.
    pub verb: String,
    pub outcome: Outcome,
    /// Display text: the skill's output, `OK`, or a diagnostic.
    pub text: String,
}

impl ReportEntry {
    fn no_input() -> Self {
        Self {
            verb: String::new(),
            outcome: Outcome::NoInput,
            text: NO_INPUT.to_string(),
        }
    }

    fn no_handler(verb: &str) -> Self {
        Self {
            verb: verb.to_string(),
            outcome: Outcome::NoHandler,
            text: format!("no handler for verb: {}", verb),
        }
    }

    fn ok(verb: &str, output: Option<String>) -> Self {
        Self {
            verb: verb.to_string(),
            outcome: Outcome::Ok,
            text: output.unwrap_or_else(|| OK.to_string()),
        }
    }

    fn failed(verb: &str, error: &dyn std::error::Error) -> Self {
        Self {
            verb: verb.to_string(),
            outcome: Outcome::Failed,
            text: format!("error: {}", error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome == Outcome::Ok
    }
}

/// Ordered per-command outcomes of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionReport {
    pub entries: Vec<ReportEntry>,
}

impl ExecutionReport {
    /// Display text of every entry, in plan order.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` when every command completed successfully.
    pub fn all_ok(&self) -> bool {
        self.entries.iter().all(ReportEntry::is_ok)
    }

    /// Number of entries that did not complete successfully.
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_ok()).count()
    }
}

/// Interprets raw input against a registry of skills.
#[derive(Debug, Clone)]
pub struct ScriptEngine {
    registry: Arc<SkillRegistry>,
    parser: PlanParser,
}

impl ScriptEngine {
    pub fn new(registry: Arc<SkillRegistry>, parser: PlanParser) -> Self {
        Self { registry, parser }
    }

    pub fn registry(&self) -> &SkillRegistry {
        &self.registry
    }

    /// Interpret and execute one raw input.
    pub async fn run(&self, raw: &str) -> ExecutionReport {
        if raw.trim().is_empty() {
            log::debug!("Engine: blank input");
            return ExecutionReport {
                entries: vec![ReportEntry::no_input()],
            };
        }

        let plan = self.parser.parse(raw);
        let report = self.execute(&plan).await;

        log::info!(
            "Engine: ran {} command(s), {} not ok",
            report.len(),
            report.failures()
        );
        report
    }

    /// Execute an already parsed plan.
    pub async fn execute(&self, plan: &Plan) -> ExecutionReport {
        let mut entries = Vec::with_capacity(plan.len());
        for command in plan {
            entries.push(self.dispatch(command).await);
        }
        ExecutionReport { entries }
    }

    async fn dispatch(&self, command: &Command) -> ReportEntry {
        let verb = command.verb();

        let skill = match self.registry.resolve(&verb) {
            Some(skill) => skill,
            None => {
                log::warn!("Engine: no handler for verb '{}'", verb);
                return ReportEntry::no_handler(&verb);
            }
        };

        log::debug!("Engine: dispatching '{}' to skill '{}'", verb, skill.name());

        match skill.handle(command).await {
            Ok(output) => ReportEntry::ok(&verb, output),
            Err(e) => {
                log::warn!("Engine: skill '{}' failed on '{}': {}", skill.name(), verb, e);
                ReportEntry::failed(&verb, &e)
            }
        }
    }
}

//! Skills: the capability handlers commands are dispatched to.
//!
//! A skill has a unique name, claims one or more verbs, and exposes a single
//! async operation that consumes a [`Command`]. The [`SkillRegistry`] maps
//! verbs to skills; the engine awaits each skill before moving on.

pub mod builtin;
pub mod registry;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::command::Command;
use crate::store::StoreError;

pub use registry::{CollisionPolicy, SkillRegistry};

/// Errors a skill can fail with. The engine formats them into the report.
#[derive(Debug, Error)]
pub enum SkillError {
    /// A required argument was absent or empty.
    #[error("{verb}: missing argument '{key}'")]
    MissingArgument { verb: String, key: String },

    /// An argument was present but unusable.
    #[error("{verb}: invalid argument '{key}': {reason}")]
    InvalidArgument {
        verb: String,
        key: String,
        reason: String,
    },

    /// The collaborator backing this skill is not configured or reachable.
    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Other(String),
}

impl SkillError {
    pub fn missing(verb: &str, key: &str) -> Self {
        Self::MissingArgument {
            verb: verb.to_string(),
            key: key.to_string(),
        }
    }
}

/// Result of one skill invocation: optional text, or an error.
pub type SkillResult = Result<Option<String>, SkillError>;

/// A registered capability handler.
///
/// Skills live for the whole process and are shared behind `Arc`, so any
/// internal state they keep needs its own synchronisation.
#[async_trait]
pub trait Skill: Send + Sync + fmt::Debug {
    /// Unique identity of the skill.
    fn name(&self) -> &str;

    /// Verbs this skill claims. Matched case-insensitively.
    fn verbs(&self) -> &[&'static str];

    /// Execute one command addressed to one of this skill's verbs.
    async fn handle(&self, command: &Command) -> SkillResult;
}

/// Fetch a required, non-blank string argument.
pub(crate) fn require_str<'a>(command: &'a Command, key: &str) -> Result<&'a str, SkillError> {
    command
        .str_arg(key)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SkillError::missing(&command.verb(), key))
}

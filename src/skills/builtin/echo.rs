//! Liveness skill.

use async_trait::async_trait;

use crate::command::Command;
use crate::skills::{Skill, SkillResult};

/// `echo` returns its `text` argument; `ping` answers `pong`.
#[derive(Debug, Default)]
pub struct EchoSkill;

#[async_trait]
impl Skill for EchoSkill {
    fn name(&self) -> &str {
        "echo"
    }

    fn verbs(&self) -> &[&'static str] {
        &["echo", "ping"]
    }

    async fn handle(&self, command: &Command) -> SkillResult {
        match command.verb().as_str() {
            "ping" => Ok(Some("pong".to_string())),
            _ => Ok(command.str_arg("text").map(str::to_string)),
        }
    }
}

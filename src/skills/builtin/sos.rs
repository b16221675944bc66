//! Emergency message relay.
//!
//! Messages are POSTed as JSON to a configured webhook. Without a webhook
//! the skill reports itself unavailable instead of pretending to deliver.

use async_trait::async_trait;
use chrono::Utc;

use crate::command::Command;
use crate::skills::{require_str, Skill, SkillError, SkillResult};

/// Handles `sos_send`.
#[derive(Debug, Clone)]
pub struct SosSkill {
    webhook: Option<String>,
    client: reqwest::Client,
}

impl SosSkill {
    pub fn new(webhook: Option<String>, client: reqwest::Client) -> Self {
        Self { webhook, client }
    }
}

#[async_trait]
impl Skill for SosSkill {
    fn name(&self) -> &str {
        "sos"
    }

    fn verbs(&self) -> &[&'static str] {
        &["sos_send"]
    }

    async fn handle(&self, command: &Command) -> SkillResult {
        let message = require_str(command, "message")?;
        let webhook = self
            .webhook
            .as_deref()
            .ok_or_else(|| SkillError::Unavailable("no SOS webhook configured".to_string()))?;

        let payload = serde_json::json!({
            "message": message,
            "sent_at": Utc::now().to_rfc3339(),
        });

        log::warn!("SOS: relaying emergency message");
        let response = self
            .client
            .post(webhook)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        Ok(Some(format!("SOS sent ({})", response.status().as_u16())))
    }
}

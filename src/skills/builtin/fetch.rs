//! Plain HTTP GET.

use async_trait::async_trait;

use crate::command::Command;
use crate::skills::{require_str, Skill, SkillError, SkillResult};

/// Longest body excerpt returned in the report, in characters.
pub const MAX_BODY_CHARS: usize = 512;

/// Handles `http_get`: fetches `url` and returns `"<status> <body excerpt>"`.
#[derive(Debug, Clone)]
pub struct HttpFetchSkill {
    client: reqwest::Client,
}

impl HttpFetchSkill {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Skill for HttpFetchSkill {
    fn name(&self) -> &str {
        "fetch"
    }

    fn verbs(&self) -> &[&'static str] {
        &["http_get"]
    }

    async fn handle(&self, command: &Command) -> SkillResult {
        let url = require_str(command, "url")?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SkillError::InvalidArgument {
                verb: command.verb(),
                key: "url".to_string(),
                reason: "expected an http(s) URL".to_string(),
            });
        }

        log::debug!("Fetch: GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(Some(format!("{} {}", status, excerpt(&body))))
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_BODY_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(MAX_BODY_CHARS).collect();
    cut.push('…');
    cut
}

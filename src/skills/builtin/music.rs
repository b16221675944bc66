//! Music playback requests.
//!
//! The skill owns the current playback session. Rendering audio belongs to
//! the platform player; this skill only tracks what was requested.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::command::Command;
use crate::skills::{require_str, Skill, SkillResult};

const NOTHING_PLAYING: &str = "nothing playing";

/// The active playback session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    pub query: String,
    pub started_at: DateTime<Utc>,
}

/// Handles `music_play`, `music_stop` and `music_status`.
#[derive(Debug, Default)]
pub struct MusicSkill {
    session: Mutex<Option<PlaybackSession>>,
}

impl MusicSkill {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the active session.
    pub fn current(&self) -> Option<PlaybackSession> {
        self.session.lock().clone()
    }
}

#[async_trait]
impl Skill for MusicSkill {
    fn name(&self) -> &str {
        "music"
    }

    fn verbs(&self) -> &[&'static str] {
        &["music_play", "music_stop", "music_status"]
    }

    async fn handle(&self, command: &Command) -> SkillResult {
        match command.verb().as_str() {
            "music_stop" => Ok(Some(match self.session.lock().take() {
                Some(session) => format!("Stopped: {}", session.query),
                None => NOTHING_PLAYING.to_string(),
            })),
            "music_status" => Ok(Some(match self.session.lock().as_ref() {
                Some(session) => format!("Playing: {}", session.query),
                None => NOTHING_PLAYING.to_string(),
            })),
            _ => {
                let query = require_str(command, "query")?.to_string();
                let previous = self.session.lock().replace(PlaybackSession {
                    query: query.clone(),
                    started_at: Utc::now(),
                });
                if let Some(previous) = previous {
                    log::debug!("Music: replacing session '{}'", previous.query);
                }
                Ok(Some(format!("Playing: {}", query)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_play_status_stop() {
        let music = MusicSkill::new();

        let out = music.handle(&Command::new("music_status")).await.unwrap();
        assert_eq!(out.as_deref(), Some(NOTHING_PLAYING));

        let out = music
            .handle(&Command::new("music_play").with_arg("query", "play lofi beats"))
            .await
            .unwrap();
        assert_eq!(out.as_deref(), Some("Playing: play lofi beats"));
        assert_eq!(music.current().unwrap().query, "play lofi beats");

        music
            .handle(&Command::new("music_play").with_arg("query", "jazz"))
            .await
            .unwrap();
        let out = music.handle(&Command::new("music_stop")).await.unwrap();
        assert_eq!(out.as_deref(), Some("Stopped: jazz"));
        assert!(music.current().is_none());
    }

    #[tokio::test]
    async fn test_play_requires_query() {
        let err = MusicSkill::new()
            .handle(&Command::new("music_play"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "music_play: missing argument 'query'");
    }
}

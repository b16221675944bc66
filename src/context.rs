//! Application context.
//!
//! Built once at startup and handed to whatever needs the engine. Owns the
//! skill registry, the script engine, the usage recommender and the store
//! they share. Nothing here is a global.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::config::Config;
use crate::engine::{ExecutionReport, ScriptEngine};
use crate::parser::PlanParser;
use crate::skills::builtin::{EchoSkill, HttpFetchSkill, MusicSkill, NoteSkill, SosSkill};
use crate::skills::SkillRegistry;
use crate::store::{KvStore, SqliteStore, StoreError};
use crate::usage::UsageRecommender;

/// Errors raised while assembling the context.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("could not open store: {0}")]
    Store(#[from] StoreError),

    #[error("could not build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Outcome of one submitted input.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub report: ExecutionReport,
    /// Current shortcut proposal, after counting this input.
    pub shortcut: Option<String>,
}

/// Everything one running process needs.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn KvStore>,
    pub engine: ScriptEngine,
    pub usage: UsageRecommender,
}

impl AppContext {
    /// Open the SQLite store under the configured directory and register
    /// the built-in skills.
    pub fn from_config(config: Config) -> Result<Self, ContextError> {
        let dir = config.storage_dir();
        log::info!("Opening store in {}", dir.display());
        let store: Arc<dyn KvStore> = Arc::new(SqliteStore::in_dir(&dir)?);
        Self::with_store(config, store)
    }

    /// Register the built-in skills over the given store.
    pub fn with_store(config: Config, store: Arc<dyn KvStore>) -> Result<Self, ContextError> {
        let mut registry = SkillRegistry::with_policy(config.collision_policy);
        register_builtin_skills(&mut registry, &config, Arc::clone(&store))?;
        Ok(Self::new(config, store, registry))
    }

    /// Assemble a context from an already populated registry.
    pub fn new(config: Config, store: Arc<dyn KvStore>, registry: SkillRegistry) -> Self {
        log::info!(
            "Registered {} skill(s): {}",
            registry.len(),
            registry.names().join(", ")
        );
        let engine = ScriptEngine::new(
            Arc::new(registry),
            PlanParser::new(config.nl_rules.clone()),
        );
        let usage = UsageRecommender::with_threshold(Arc::clone(&store), config.shortcut_threshold);
        Self {
            config,
            store,
            engine,
            usage,
        }
    }

    /// Run `raw`, count it, and return the report with the current shortcut.
    ///
    /// Usage bookkeeping failures are logged and never hide the report.
    pub async fn submit(&self, raw: &str) -> Submission {
        let report = self.engine.run(raw).await;

        if let Err(e) = self.usage.alog_command(raw).await {
            log::error!("Usage: could not record input: {}", e);
        }
        let shortcut = match self.usage.arecommend_shortcut().await {
            Ok(shortcut) => shortcut,
            Err(e) => {
                log::error!("Usage: could not compute shortcut: {}", e);
                None
            }
        };

        Submission { report, shortcut }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .field("usage", &self.usage)
            .finish()
    }
}

/// Register every built-in skill.
pub fn register_builtin_skills(
    registry: &mut SkillRegistry,
    config: &Config,
    store: Arc<dyn KvStore>,
) -> Result<(), ContextError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .build()?;

    registry.register(Arc::new(EchoSkill));
    registry.register(Arc::new(NoteSkill::new(store)));
    registry.register(Arc::new(MusicSkill::new()));
    registry.register(Arc::new(SosSkill::new(config.sos_webhook.clone(), client.clone())));
    registry.register(Arc::new(HttpFetchSkill::new(client)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Outcome;
    use crate::store::MemoryStore;

    fn context() -> AppContext {
        AppContext::with_store(Config::default(), Arc::new(MemoryStore::new())).unwrap()
    }

    #[tokio::test]
    async fn test_builtin_verbs_registered() {
        let ctx = context();
        let registry = ctx.engine.registry();
        for verb in [
            "save_note",
            "read_notes",
            "music_play",
            "sos_send",
            "http_get",
            "ping",
        ] {
            assert!(registry.resolve(verb).is_some(), "missing {}", verb);
        }
    }

    #[tokio::test]
    async fn test_note_plan_observes_own_effects() {
        let ctx = context();
        let submission = ctx
            .submit(r#"{"plan":[{"do":"save_note","text":"x"},{"do":"save_note","text":"y"},{"do":"read_notes"}]}"#)
            .await;

        assert_eq!(
            submission.report.lines(),
            vec!["Saved note: x", "Saved note: y", "x\ny"]
        );
        assert_eq!(submission.shortcut, None);
    }

    #[tokio::test]
    async fn test_submit_proposes_shortcut_after_three_runs() {
        let ctx = context();
        let first = ctx.submit("play lofi beats").await;
        assert_eq!(first.report.lines(), vec!["Playing: play lofi beats"]);
        assert_eq!(first.shortcut, None);

        ctx.submit("play lofi beats").await;
        let third = ctx.submit("play lofi beats").await;
        assert_eq!(third.shortcut.as_deref(), Some("play lofi beats"));
    }

    #[tokio::test]
    async fn test_blank_input_not_counted() {
        let ctx = context();
        let submission = ctx.submit("  ").await;
        assert_eq!(submission.report.entries[0].outcome, Outcome::NoInput);
        assert!(ctx.usage.counts().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sos_without_webhook_reports_error() {
        let ctx = context();
        let submission = ctx.submit("SOS I fell down").await;
        assert_eq!(submission.report.entries[0].outcome, Outcome::Failed);
        assert_eq!(
            submission.report.lines(),
            vec!["error: unavailable: no SOS webhook configured"]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submits_over_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            storage_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let ctx = Arc::new(AppContext::from_config(config).unwrap());

        let mut handles = Vec::new();
        for i in 0..6 {
            let ctx = Arc::clone(&ctx);
            handles.push(tokio::spawn(async move {
                let raw = format!(r#"{{"do":"save_note","text":"n{}"}}"#, i);
                ctx.submit(&raw).await
            }));
        }
        for handle in handles {
            let submission = handle.await.unwrap();
            assert!(submission.report.all_ok());
        }

        let report = ctx.engine.run(r#"{"do":"read_notes"}"#).await;
        assert_eq!(report.lines()[0].lines().count(), 6);
        assert_eq!(ctx.usage.counts().unwrap().len(), 6);
    }
}

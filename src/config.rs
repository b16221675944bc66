//! Runtime configuration.
//!
//! Loaded from an optional YAML file (path in `SKILLSCRIPT_CONFIG`), then
//! overridden from the environment:
//!
//! - `PORT`: HTTP port, binds `0.0.0.0:<PORT>`
//! - `SKILLSCRIPT_STORAGE_DIR`: directory of the SQLite database
//! - `SKILLSCRIPT_SOS_WEBHOOK`: endpoint the SOS skill posts to
//!
//! ```yaml
//! bind_addr: 127.0.0.1:8080
//! shortcut_threshold: 3
//! collision_policy: last_wins
//! nl_rules:
//!   fallback_verb: save_note
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::NlRules;
use crate::paths::{default_storage_dir, STORAGE_DIR_ENV};
use crate::skills::CollisionPolicy;
use crate::usage::DEFAULT_SHORTCUT_THRESHOLD;

/// Environment variable naming the YAML config file.
pub const CONFIG_PATH_ENV: &str = "SKILLSCRIPT_CONFIG";
/// Environment variable holding the SOS webhook URL.
pub const SOS_WEBHOOK_ENV: &str = "SKILLSCRIPT_SOS_WEBHOOK";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Process-wide settings, fixed at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Where the SQLite database lives. `None` means the platform default.
    pub storage_dir: Option<PathBuf>,
    /// Runs needed before an input is proposed as a shortcut.
    pub shortcut_threshold: u64,
    pub collision_policy: CollisionPolicy,
    pub nl_rules: NlRules,
    pub sos_webhook: Option<String>,
    /// Timeout for outgoing HTTP requests made by skills.
    pub fetch_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            storage_dir: None,
            shortcut_threshold: DEFAULT_SHORTCUT_THRESHOLD,
            collision_policy: CollisionPolicy::default(),
            nl_rules: NlRules::default(),
            sos_webhook: None,
            fetch_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Parse a YAML document. Missing fields take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load from `SKILLSCRIPT_CONFIG` (if set) and apply environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `PORT`, `SKILLSCRIPT_STORAGE_DIR` and `SKILLSCRIPT_SOS_WEBHOOK`
    /// as returned by `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT is not a port number: {}", port)))?;
            self.bind_addr = format!("0.0.0.0:{}", port);
        }
        if let Some(dir) = lookup(STORAGE_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            self.storage_dir = Some(PathBuf::from(dir));
        }
        if let Some(webhook) = lookup(SOS_WEBHOOK_ENV).filter(|w| !w.trim().is_empty()) {
            self.sos_webhook = Some(webhook);
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shortcut_threshold == 0 {
            return Err(ConfigError::Invalid(
                "shortcut_threshold must be at least 1".to_string(),
            ));
        }
        if self.nl_rules.fallback_verb.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "nl_rules.fallback_verb must not be empty".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Storage directory, falling back to the platform default.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(default_storage_dir)
    }
}

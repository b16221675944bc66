//! # skillscript
//!
//! A command-interpretation and skill-dispatch engine. One raw input (a
//! JSON plan or a natural-language phrase) becomes an ordered list of
//! commands; each command is dispatched by verb to a registered skill; the
//! outcomes come back as one ordered report.
//!
//! ```no_run
//! use std::sync::Arc;
//! use skillscript::config::Config;
//! use skillscript::context::AppContext;
//! use skillscript::store::MemoryStore;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = AppContext::with_store(Config::default(), Arc::new(MemoryStore::new()))?;
//! let submission = ctx.submit("play lofi beats").await;
//! assert_eq!(submission.report.lines(), vec!["Playing: play lofi beats"]);
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod context;
pub mod engine;
pub mod parser;
pub mod paths;
pub mod server;
pub mod skills;
pub mod store;
pub mod usage;

pub use command::{Command, Plan};
pub use context::AppContext;
pub use engine::{ExecutionReport, Outcome, ReportEntry, ScriptEngine};
pub use parser::PlanParser;
pub use skills::{Skill, SkillError, SkillRegistry, SkillResult};
pub use usage::UsageRecommender;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

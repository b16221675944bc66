//! HTTP surface for the script engine.
//!
//! # Endpoints
//!
//! - `GET  /health`  : Liveness probe
//! - `POST /run`     : Interpret and execute one raw input
//! - `GET  /shortcut`: Current shortcut proposal
//! - `GET  /skills`  : Registered skills and their verbs

pub mod routes;

pub use routes::{app_router, AppState};

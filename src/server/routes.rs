//! Axum route handlers.
//!
//! # Routes
//!
//! - `GET  /health`  : Returns `{"status": "ok", "version": "..."}`
//! - `POST /run`     : Accepts `{"input": "..."}`, returns the execution report
//! - `GET  /shortcut`: Returns `{"shortcut": "..." | null}`
//! - `GET  /skills`  : Returns registered skill names and the verb index

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::engine::ReportEntry;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub context: Arc<AppContext>,
}

impl AppState {
    pub fn new(context: AppContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }
}

/// Body of `POST /run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub input: String,
}

/// Response of `POST /run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub entries: Vec<Value>,
    /// Display text of each entry, in plan order.
    pub lines: Vec<String>,
    pub shortcut: Option<String>,
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/run", post(run_handler))
        .route("/shortcut", get(shortcut_handler))
        .route("/skills", get(skills_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health: liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "skillscript",
    }))
}

/// POST /run: run one input through the engine.
///
/// Always answers 200 with a report; failures of individual commands are
/// entries in it, not HTTP errors.
async fn run_handler(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Json<RunResponse> {
    let submission = state.context.submit(&request.input).await;

    let entries = submission
        .report
        .entries
        .iter()
        .map(entry_json)
        .collect();

    Json(RunResponse {
        entries,
        lines: submission.report.lines(),
        shortcut: submission.shortcut,
    })
}

fn entry_json(entry: &ReportEntry) -> Value {
    serde_json::to_value(entry).unwrap_or_else(|_| Value::String(entry.text.clone()))
}

/// GET /shortcut: current shortcut proposal.
async fn shortcut_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.context.usage.arecommend_shortcut().await {
        Ok(shortcut) => Ok(Json(serde_json::json!({ "shortcut": shortcut }))),
        Err(e) => {
            log::error!("GET /shortcut failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            ))
        }
    }
}

/// GET /skills: registered skills and verb ownership.
async fn skills_handler(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.context.engine.registry();
    let verbs: Vec<Value> = registry
        .verbs()
        .into_iter()
        .map(|(verb, skill)| serde_json::json!({ "verb": verb, "skill": skill }))
        .collect();

    Json(serde_json::json!({
        "skills": registry.names(),
        "verbs": verbs,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn state() -> AppState {
        let context =
            AppContext::with_store(Config::default(), Arc::new(MemoryStore::new())).unwrap();
        AppState::new(context)
    }

    fn run_request(input: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/run")
            .header("Content-Type", "application/json")
            .body(Body::from(
                serde_json::to_string(&RunRequest {
                    input: input.to_string(),
                })
                .unwrap(),
            ))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = app_router(state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["service"], "skillscript");
    }

    #[tokio::test]
    async fn test_run_returns_ordered_report() {
        let app = app_router(state());

        let response = app
            .oneshot(run_request(r#"[{"do":"ping"},{"do":"teleport"}]"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["lines"][0], "pong");
        assert_eq!(json["lines"][1], "no handler for verb: teleport");
        assert_eq!(json["entries"][1]["outcome"], "no_handler");
        assert_eq!(json["entries"][1]["verb"], "teleport");
        assert!(json["shortcut"].is_null());
    }

    #[tokio::test]
    async fn test_run_blank_input() {
        let app = app_router(state());
        let response = app.oneshot(run_request("")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["lines"], serde_json::json!(["no input"]));
        assert_eq!(json["entries"][0]["outcome"], "no_input");
    }

    #[tokio::test]
    async fn test_shortcut_after_repeated_runs() {
        let state = state();

        for _ in 0..3 {
            let app = app_router(state.clone());
            app.oneshot(run_request("ping me")).await.unwrap();
        }

        let app = app_router(state.clone());
        let request = Request::builder()
            .uri("/shortcut")
            .body(Body::empty())
            .unwrap();
        let json = body_json(app.oneshot(request).await.unwrap()).await;
        assert_eq!(json["shortcut"], "ping me");
    }

    #[tokio::test]
    async fn test_skills_listing() {
        let app = app_router(state());
        let request = Request::builder()
            .uri("/skills")
            .body(Body::empty())
            .unwrap();
        let json = body_json(app.oneshot(request).await.unwrap()).await;

        let skills: Vec<&str> = json["skills"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(skills, vec!["echo", "fetch", "music", "notes", "sos"]);
        assert!(json["verbs"]
            .as_array()
            .unwrap()
            .iter()
            .any(|v| v["verb"] == "save_note" && v["skill"] == "notes"));
    }
}

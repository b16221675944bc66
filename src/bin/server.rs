//! skillscript HTTP server binary.
//!
//! # Environment Variables
//!
//! - `PORT`: HTTP port (default: 8080)
//! - `SKILLSCRIPT_CONFIG`: optional YAML config file
//! - `SKILLSCRIPT_STORAGE_DIR`: directory of the SQLite database
//! - `SKILLSCRIPT_SOS_WEBHOOK`: endpoint for `sos_send`
//! - `RUST_LOG`: Tracing filter (default: "info,skillscript=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin skillscript-server
//! curl -s localhost:8080/run -H 'content-type: application/json' \
//!      -d '{"input": "play lofi beats"}'
//! ```

use anyhow::Context;
use skillscript::config::Config;
use skillscript::context::AppContext;
use skillscript::server::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (also captures `log` records from the library)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,skillscript=debug".into()),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;
    let bind_addr = config.bind_addr.clone();

    let context = AppContext::from_config(config).context("building application context")?;
    let app = app_router(AppState::new(context));

    tracing::info!("skillscript server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health  : liveness probe");
    tracing::info!("  POST /run     : run one input");
    tracing::info!("  GET  /shortcut: shortcut proposal");
    tracing::info!("  GET  /skills  : registered skills");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}

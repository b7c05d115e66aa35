//! HTTP front end: `POST /analyze` and `GET /health`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::analysis::{AnalyzeError, Analyzer};
use crate::config::Config;

/// State shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    request_seq: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(analyzer: Arc<Analyzer>) -> Self {
        Self {
            analyzer,
            request_seq: Arc::new(AtomicU64::new(1)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM.
pub async fn serve(config: &Config, analyzer: Arc<Analyzer>) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "server listening");

    axum::serve(listener, build_router(AppState::new(analyzer)))
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn analyze_handler(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let request_id = state.request_seq.fetch_add(1, Ordering::Relaxed);
    // An unreadable body carries no URL.
    let url = body.ok().and_then(|Json(req)| req.url).unwrap_or_default();
    info!(request_id, url = %url, "analyze request");

    match state.analyzer.analyze(&url).await {
        Ok(report) => {
            info!(request_id, score = report.overall_score, "analyze response");
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e @ (AnalyzeError::MissingUrl | AnalyzeError::InvalidUrl(_))) => {
            warn!(request_id, error = %e, "rejected request");
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e @ AnalyzeError::Fetch(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Failed to analyze website",
                "details": e.to_string(),
            })),
        )
            .into_response(),
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received");
}

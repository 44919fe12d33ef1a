// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// `GET /` serves the HTML dashboard. JSON endpoints live under `/api/v1/`.
// The service is read-only apart from `POST /api/v1/refresh`, which only
// asks the refresh loop to run early.
//
// CORS is permissive; the dashboard exposes public market data only.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::api::page::render_dashboard;
use crate::app_state::AppState;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(dashboard_page))
        .route("/api/v1/health", get(health))
        .route("/api/v1/state", get(latest_state))
        .route("/api/v1/errors", get(recent_errors))
        .route("/api/v1/refresh", post(request_refresh))
        .route("/api/v1/ws", get(crate::api::ws::ws_handler))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Dashboard page
// =============================================================================

async fn dashboard_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let snapshot = state.latest_snapshot();
    let refresh_secs = snapshot
        .as_ref()
        .map(|s| s.refresh_interval_secs)
        .unwrap_or_else(|| state.runtime_config.read().refresh_interval_secs);
    Html(render_dashboard(snapshot.as_ref(), refresh_secs))
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    server_time: i64,
    uptime_secs: u64,
    has_snapshot: bool,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        server_time: chrono::Utc::now().timestamp_millis(),
        uptime_secs: state.uptime_secs(),
        has_snapshot: state.latest_snapshot().is_some(),
    };
    Json(resp)
}

// =============================================================================
// Latest snapshot
// =============================================================================

async fn latest_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.latest_snapshot() {
        Some(snapshot) => Json(snapshot).into_response(),
        None => {
            let body = serde_json::json!({
                "snapshot": null,
                "message": "No refresh cycle has completed yet"
            });
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
    }
}

// =============================================================================
// Error log
// =============================================================================

async fn recent_errors(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.recent_errors())
}

// =============================================================================
// Manual refresh
// =============================================================================

#[derive(Serialize)]
struct RefreshResponse {
    accepted: bool,
    state_version: u64,
}

async fn request_refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.request_refresh();
    info!("manual refresh requested via API");
    (
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            accepted: true,
            state_version: state.current_state_version(),
        }),
    )
}

//! Health check handlers.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = state.auth.users().health_check().await.unwrap_or_else(|e| {
        warn!(error = %e, "User store health check failed");
        false
    });
    let sessions = state
        .sessions
        .backend()
        .health_check()
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Session backend health check failed");
            false
        });

    let status = if database && sessions { "ok" } else { "degraded" };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        sessions,
    }))
}

// handlers/public/health.rs - GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api::format::timestamp;
use crate::state::AppState;

/// Liveness plus a store ping. Answers 503 when the store is unreachable.
pub async fn health_get(State(state): State<AppState>) -> impl IntoResponse {
    let environment = state.config.environment.as_str();

    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "timestamp": timestamp(),
                "environment": environment,
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": timestamp(),
                    "environment": environment,
                    "database": "unavailable",
                })),
            )
        }
    }
}

/// Health check route
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether a pooled connection answered a trivial query
    pub database: bool,
}

/// GET /api/health
pub async fn health(State(app_state): State<AppState>) -> Json<HealthResponse> {
    let database = sqlx::query("SELECT 1")
        .execute(app_state.membership.pool())
        .await
        .map_err(|e| tracing::warn!("Health check query failed: {}", e))
        .is_ok();

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

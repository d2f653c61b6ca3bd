use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the primary database is reachable.
    pub db_healthy: bool,
    /// Whether the legacy reference database is reachable.
    pub legacy_db_healthy: bool,
}

/// GET /health -- returns service and database health.
///
/// Responds 503 when either database is unreachable.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = docvault_db::health_check(&state.pool).await.is_ok();
    let legacy_db_healthy = docvault_db::health_check(&state.legacy_pool).await.is_ok();

    let (status_code, status) = if db_healthy && legacy_db_healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            legacy_db_healthy,
        }),
    )
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

//! Health check handler.

use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::Json;
use tracing::warn;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = match sqlx::query("SELECT 1").execute(&state.db_pool).await {
        Ok(_) => "connected",
        Err(e) => {
            warn!(error = %e, "Health check database ping failed");
            "unreachable"
        }
    };

    Json(ApiResponse::ok(HealthResponse {
        status: if database == "connected" { "ok" } else { "degraded" }.to_string(),
        database: database.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_streams: state
            .gateway
            .metrics()
            .subscribers_active
            .load(Ordering::Relaxed),
    }))
}

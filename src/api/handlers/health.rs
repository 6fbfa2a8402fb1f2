//! Handlers for health check endpoints.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "connected" },
///     "cache": { "status": "ok", "message": "redis" }
///   }
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match state.account_service.ping().await {
        Ok(()) => CheckStatus::ok("connected"),
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            CheckStatus::error("database unreachable")
        }
    };

    let cache = if state.cache.health_check().await {
        CheckStatus::ok(state.cache.backend())
    } else {
        CheckStatus::error(format!("{} unreachable", state.cache.backend()))
    };

    let healthy = database.is_ok() && cache.is_ok();

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks { database, cache },
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe.
///
/// `GET /ping` → `pong`
pub async fn ping_handler() -> &'static str {
    "pong"
}

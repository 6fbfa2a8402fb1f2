//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /auth/signup`  - Account creation (public)
//! - `GET  /auth/verify`  - Email verification (public)
//! - `POST /auth/login`   - Session token issue (public)
//! - `POST /url/shorten`  - Link creation (Bearer token required)
//! - `GET  /health`       - Health check: DB, cache (public)
//! - `GET  /ping`         - Liveness probe (public)
//! - `GET  /{code}`       - Short link redirect (public)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Timeout** - Whole-request deadline, answered with 408
//! - **Authentication** - Bearer token on `/url/*`
//! - **Path normalization** - Trailing slash handling

use std::time::Duration;

use crate::api;
use crate::api::handlers::{health_handler, ping_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::timeout::TimeoutLayer;

/// Builds the router with every route and middleware except path
/// normalization.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let require_api_version = state.require_api_version;

    Router::new()
        .merge(api::routes::auth_routes(require_api_version))
        .merge(api::routes::protected_routes(state.clone()))
        .route("/health", get(health_handler))
        .route("/ping", get(ping_handler))
        .route("/{code}", get(redirect_handler))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(tracing::layer())
}

/// Constructs the application service with trailing slashes trimmed before
/// routing.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `request_timeout` - deadline for a whole request, including mail delivery
pub fn app_router(state: AppState, request_timeout: Duration) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, request_timeout))
}

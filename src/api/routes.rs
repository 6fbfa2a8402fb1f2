//! API route configuration.
//!
//! Account endpoints are public. Shortening requires a Bearer token issued
//! by `/auth/login`, checked by [`crate::api::middleware::auth`].

use crate::api::handlers::{login_handler, shorten_handler, signup_handler, verify_handler};
use crate::api::middleware::{api_version, auth};
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Account routes.
///
/// # Endpoints
///
/// - `POST /auth/signup`  - Create an account and mail its verification link
/// - `GET  /auth/verify`  - Consume a verification link (`?v=<token>`)
/// - `POST /auth/login`   - Exchange credentials for a session token
///
/// When `require_api_version` is set, signup and login additionally demand
/// the `Api: v1` header.
pub fn auth_routes(require_api_version: bool) -> Router<AppState> {
    let mut credentials = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler));

    if require_api_version {
        credentials = credentials.route_layer(middleware::from_fn(api_version::layer));
    }

    Router::new()
        .route("/auth/verify", get(verify_handler))
        .merge(credentials)
}

/// Routes protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST /url/shorten` - Shorten a URL for the authenticated user
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/url/shorten", post(shorten_handler))
        .route_layer(middleware::from_fn_with_state(state, auth::layer))
}

//! API version header guard.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::AppError;

/// Header carrying the requested API version.
pub const API_VERSION_HEADER: &str = "api";

/// The only version this service speaks.
pub const SUPPORTED_API_VERSION: &str = "v1";

/// Rejects requests that do not ask for [`SUPPORTED_API_VERSION`].
///
/// Applied to guarded routes only when `REQUIRE_API_VERSION` is enabled.
///
/// # Errors
///
/// - [`AppError::MissingApiVersion`] (400) if the `Api` header is absent
/// - [`AppError::UnsupportedApiVersion`] (400) for any other value
pub async fn layer(req: Request, next: Next) -> Result<Response, AppError> {
    match req.headers().get(API_VERSION_HEADER) {
        None => Err(AppError::MissingApiVersion),
        Some(value) if value.as_bytes() == SUPPORTED_API_VERSION.as_bytes() => {
            Ok(next.run(req).await)
        }
        Some(_) => Err(AppError::UnsupportedApiVersion),
    }
}

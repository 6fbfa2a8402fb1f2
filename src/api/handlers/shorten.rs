//! Handler for link shortening endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::extract::ValidJson;
use crate::api::middleware::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;

/// Creates (or returns the existing) short link for a URL.
///
/// # Endpoint
///
/// `POST /url/shorten` (Bearer token required)
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/x" }
/// ```
///
/// # Response
///
/// ```json
/// { "link": "https://lw.example/aB3dE9xY" }
/// ```
///
/// Shortening the same URL again returns the same link.
///
/// # Errors
///
/// - **401**: missing, malformed or invalid token
/// - **422**: not an absolute http(s) URL
/// - **500**: the token's user no longer exists, or a storage failure
pub async fn shorten_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidJson(payload): ValidJson<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let owner = match state.account_service.get_by_id(user.user_id).await {
        Ok(owner) => owner,
        Err(AppError::NotFound(_)) => {
            return Err(AppError::internal(format!(
                "token subject {} has no user record",
                user.user_id
            )));
        }
        Err(e) => return Err(e),
    };

    let link = state
        .link_service
        .create(owner.id, &payload.url, state.short_code_length)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            link: link.public_url(&state.base_url),
        }),
    ))
}

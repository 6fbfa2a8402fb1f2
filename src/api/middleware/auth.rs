//! Bearer token authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Identity of the caller, attached to the request by [`layer`].
///
/// Handlers behind the middleware take it as an extractor:
///
/// ```rust,ignore
/// async fn handler(user: AuthenticatedUser) -> String {
///     user.user_id.to_string()
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| AppError::internal("route is missing the authentication layer"))
    }
}

/// Authenticates requests using Bearer tokens from the Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// The token is checked by the token service only; whether the user still
/// exists is left to handlers that need it.
///
/// # Errors
///
/// Returns `401 Unauthorized` (with `WWW-Authenticate: Bearer`) if:
/// - the header is missing ([`AppError::MissingToken`])
/// - the scheme is not `Bearer` or the token is empty ([`AppError::MalformedHeader`])
/// - the token fails validation ([`AppError::Token`])
///
/// # Example
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/url/shorten", post(shorten_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let verified = {
        let token = bearer_token(req.headers())?;
        st.token_service.decode(token)?
    };

    req.extensions_mut().insert(AuthenticatedUser {
        user_id: verified.user_id,
        issued_at: verified.issued_at,
    });

    Ok(next.run(req).await)
}

/// Extracts the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::MissingToken)?
        .to_str()
        .map_err(|_| AppError::MalformedHeader)?;

    let (scheme, token) = value.split_once(' ').ok_or(AppError::MalformedHeader)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AppError::MalformedHeader);
    }

    Ok(token)
}

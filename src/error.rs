//! Application error type and HTTP error rendering.
//!
//! Every failure that can leave a handler is an [`AppError`]. Lower layers use
//! narrower error types ([`TokenError`], [`StoreError`], [`EntropyError`]) that
//! convert into it at the service boundary.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use validator::ValidationErrors;

use crate::application::services::token_service::TokenError;
use crate::domain::repositories::StoreError;
use crate::utils::id_generator::EntropyError;

/// Client message shared by every token failure, so callers cannot probe
/// which check rejected a token.
const LOGIN_TOKEN_MESSAGE: &str = "invalid or expired login token";

/// JSON error body.
///
/// ```json
/// { "status": "Conflict", "error": "that email is taken" }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("that email is taken")]
    DuplicateEmail,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid or expired verification token")]
    InvalidVerificationToken,

    #[error("missing authorization header")]
    MissingToken,

    #[error("malformed authorization header")]
    MalformedHeader,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("missing api version header")]
    MissingApiVersion,

    #[error("unsupported api version")]
    UnsupportedApiVersion,

    #[error("{0}")]
    NotFound(String),

    #[error("short code space exhausted")]
    CodeSpaceExhausted,

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status code this error is rendered with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidVerificationToken => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::MalformedHeader
            | AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::MissingApiVersion | AppError::UnsupportedApiVersion => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CodeSpaceExhausted | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to clients, `None` for internal failures.
    pub fn client_message(&self) -> Option<String> {
        match self {
            AppError::CodeSpaceExhausted | AppError::Internal(_) => None,
            AppError::Token(_) => Some(LOGIN_TOKEN_MESSAGE.to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn to_error_body(&self) -> ErrorBody {
        let status = self.status_code();
        ErrorBody {
            status: status.canonical_reason().unwrap_or("Unknown"),
            error: self.client_message(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Internal(_) | AppError::CodeSpaceExhausted => {
                tracing::error!(error = %self, "request failed");
            }
            AppError::Token(e) => tracing::debug!(error = %e, "token rejected"),
            _ => tracing::debug!(error = %self, status = status.as_u16(), "request rejected"),
        }

        let mut response = (status, Json(self.to_error_body())).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => AppError::not_found("record not found"),
            StoreError::UniqueViolation(key) => {
                AppError::internal(format!("unexpected unique violation on {key:?}"))
            }
            StoreError::Backend(message) => AppError::internal(message),
        }
    }
}

impl From<EntropyError> for AppError {
    fn from(e: EntropyError) -> Self {
        AppError::internal(e.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort_unstable();

        AppError::validation(format!("invalid {}", fields.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::UniqueKey;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::validation("bad").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::DuplicateEmail.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Token(TokenError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::UnsupportedApiVersion.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::CodeSpaceExhausted.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_conflict_body() {
        let body = AppError::DuplicateEmail.to_error_body();

        assert_eq!(body.status, "Conflict");
        assert_eq!(body.error.as_deref(), Some("that email is taken"));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let body = AppError::internal("connection refused (10.0.0.3:5432)").to_error_body();

        assert_eq!(body.status, "Internal Server Error");
        assert!(body.error.is_none());
    }

    #[test]
    fn test_token_errors_share_one_message() {
        let expired = AppError::Token(TokenError::Expired).client_message();
        let forged = AppError::Token(TokenError::InvalidSignature).client_message();

        assert_eq!(expired, forged);
    }

    #[test]
    fn test_store_error_conversion() {
        assert!(matches!(
            AppError::from(StoreError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(StoreError::UniqueViolation(UniqueKey::Email)),
            AppError::Internal(_)
        ));
        assert!(matches!(
            AppError::from(StoreError::Backend("boom".into())),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn test_unauthorized_response_sets_challenge_header() {
        let response = AppError::MissingToken.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}

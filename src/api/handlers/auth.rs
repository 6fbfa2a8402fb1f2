//! Handlers for signup, email verification and login.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::api::dto::auth::{CredentialsRequest, LoginResponse, StatusMessage, VerifyQuery};
use crate::api::extract::ValidJson;
use crate::error::AppError;
use crate::state::AppState;

/// Registers a new account and sends its verification mail.
///
/// # Endpoint
///
/// `POST /auth/signup`
///
/// # Request Body
///
/// ```json
/// { "email": "a@example.com", "password": "str0ngpa55w0rd" }
/// ```
///
/// # Response Codes
///
/// - **201 Created**: account created, verification mail sent
/// - **409 Conflict**: `{"status":"Conflict","error":"that email is taken"}`
/// - **422 Unprocessable Entity**: malformed email or password
pub async fn signup_handler(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<StatusMessage>), AppError> {
    state
        .verification_service
        .signup(&payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StatusMessage {
            status: "Created",
            message: "check your email to verify your account",
        }),
    ))
}

/// Consumes a verification link.
///
/// # Endpoint
///
/// `GET /auth/verify?v=<token>`
///
/// # Response Codes
///
/// - **200 OK**: account verified
/// - **422 Unprocessable Entity**: unknown, used or expired token
pub async fn verify_handler(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<StatusMessage>, AppError> {
    let token = query.v.ok_or(AppError::InvalidVerificationToken)?;

    state.verification_service.verify(&token).await?;

    Ok(Json(StatusMessage {
        status: "OK",
        message: "your email address is verified",
    }))
}

/// Exchanges credentials for a session token.
///
/// # Endpoint
///
/// `POST /auth/login`
///
/// # Response
///
/// ```json
/// { "email": "a@example.com", "id": "6f1c...", "token": "eyJhbGciOi..." }
/// ```
///
/// # Response Codes
///
/// - **200 OK**: token issued
/// - **401 Unauthorized**: `{"status":"Unauthorized","error":"invalid email or password"}`
pub async fn login_handler(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CredentialsRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state
        .account_service
        .authenticate(&payload.email, &payload.password)
        .await?;

    let token = state
        .token_service
        .encode(user.id)
        .map_err(|e| AppError::internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "login");

    Ok(Json(LoginResponse {
        email: user.email,
        id: user.id,
        token,
    }))
}

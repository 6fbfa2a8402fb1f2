//! DTOs for the signup, verification and login endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Email and password as submitted to `/auth/signup` and `/auth/login`.
///
/// Only presence is checked here; trimming and the format rules are applied
/// by the account service.
#[derive(Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(length(min = 1, max = 320, message = "email is required"))]
    pub email: String,

    #[validate(length(min = 1, max = 1024, message = "password is required"))]
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Query string of `GET /auth/verify?v=<token>`.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub v: Option<String>,
}

/// Plain status message returned by signup and verification.
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub status: &'static str,
    pub message: &'static str,
}

/// Successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub email: String,
    pub id: Uuid,
    pub token: String,
}

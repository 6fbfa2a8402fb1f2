//! User account entity.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// A registered account.
///
/// `password_hash` and `api_key` are credentials; the `Debug` output redacts
/// both so a user can be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    /// HMAC digest of the issued API key, if any.
    pub api_key: Option<String>,
    pub verification_token: Uuid,
    pub verification_expires_at: DateTime<Utc>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Returns true once the verification window has closed.
    pub fn is_verification_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.verification_expires_at
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("verified", &self.verified)
            .field("verification_expires_at", &self.verification_expires_at)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// Input data for inserting a new user.
#[derive(Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub verification_token: Uuid,
    pub verification_expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("verification_expires_at", &self.verification_expires_at)
            .finish_non_exhaustive()
    }
}

impl NewUser {
    /// Materializes the row as it looks right after insertion.
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            api_key: None,
            verification_token: self.verification_token,
            verification_expires_at: self.verification_expires_at,
            verified: false,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

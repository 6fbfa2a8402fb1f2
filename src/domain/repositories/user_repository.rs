//! Repository trait for user accounts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::StoreResult;
use crate::domain::entities::{NewUser, User};

/// Persistence contract for [`User`] records.
///
/// Implementations must enforce uniqueness of `email`, `api_key` and
/// `verification_token` and report violations as
/// [`StoreError::UniqueViolation`](super::StoreError::UniqueViolation) with the
/// matching [`UniqueKey`](super::UniqueKey).
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// `UniqueViolation(Email)` if the address is already registered.
    async fn create(&self, new_user: NewUser) -> StoreResult<User>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Exact, case-sensitive match on the stored address.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_by_verification_token(&self, token: Uuid) -> StoreResult<Option<User>>;

    /// Marks the user verified.
    ///
    /// Returns `true` if this call performed the transition and `false` if the
    /// user was already verified, in which case nothing is written.
    ///
    /// # Errors
    ///
    /// `NotFound` if no user has this ID.
    async fn set_verified(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<bool>;

    /// Replaces the stored API key digest.
    ///
    /// # Errors
    ///
    /// `NotFound` if no user has this ID, `UniqueViolation(ApiKey)` if the
    /// digest belongs to another user.
    async fn set_api_key(&self, id: Uuid, api_key: &str, at: DateTime<Utc>) -> StoreResult<()>;

    /// Round-trips to the backend; used by the health check.
    async fn ping(&self) -> StoreResult<()>;
}

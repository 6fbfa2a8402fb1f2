//! Repository trait for short link data access.

use async_trait::async_trait;
use uuid::Uuid;

use super::StoreResult;
use crate::domain::entities::{NewShortLink, ShortLink};

/// Persistence contract for [`ShortLink`] records.
///
/// Implementations must enforce a global unique `short_code` and a unique
/// `(owner, original_url)` pair, reporting violations as
/// `UniqueViolation(ShortCode)` and `UniqueViolation(OriginalUrl)`.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new short link in a single constraint-checked write.
    async fn create(&self, new_link: NewShortLink) -> StoreResult<ShortLink>;

    async fn find_by_code(&self, code: &str) -> StoreResult<Option<ShortLink>>;

    /// Finds the link `owner` created for exactly `original_url`.
    async fn find_by_original_url(
        &self,
        owner: Uuid,
        original_url: &str,
    ) -> StoreResult<Option<ShortLink>>;
}

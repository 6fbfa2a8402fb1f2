//! Link registry: short link creation and resolution.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::{LinkRepository, StoreError, UniqueKey};
use crate::error::AppError;
use crate::utils::id_generator::{SHORT_CODE_ALPHABET, new_id, new_short_code};
use crate::utils::url_validator::validate_url;

/// Service for creating and resolving short links.
///
/// Both uniqueness rules (global short code, per-owner original URL) are
/// enforced by the repository. Creation is a single insert followed by at
/// most one corrective step, so concurrent writers never need a lock.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    clock: Arc<dyn Clock>,
}

impl LinkService {
    pub fn new(repository: Arc<dyn LinkRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Shortens `original_url` on behalf of `owner`.
    ///
    /// Shortening a URL the owner already shortened returns the existing
    /// link. A short code collision is retried once with a fresh code.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL is not an absolute http(s) URL
    /// - [`AppError::CodeSpaceExhausted`] if the retried code collides again
    /// - [`AppError::Internal`] on storage or entropy failures
    pub async fn create(
        &self,
        owner: Uuid,
        original_url: &str,
        code_length: usize,
    ) -> Result<ShortLink, AppError> {
        let original_url = original_url.trim();
        validate_url(original_url).map_err(|e| AppError::validation(e.to_string()))?;

        let mut retried = false;

        loop {
            let new_link = NewShortLink {
                id: new_id()?,
                owner,
                original_url: original_url.to_string(),
                short_code: new_short_code(SHORT_CODE_ALPHABET, code_length)?,
                created_at: self.clock.now(),
            };

            match self.repository.create(new_link).await {
                Ok(link) => {
                    tracing::info!(owner = %owner, code = %link.short_code, "short link created");
                    return Ok(link);
                }
                Err(StoreError::UniqueViolation(UniqueKey::OriginalUrl)) => {
                    return self
                        .repository
                        .find_by_original_url(owner, original_url)
                        .await?
                        .ok_or_else(|| {
                            AppError::internal("conflicting short link vanished before lookup")
                        });
                }
                Err(StoreError::UniqueViolation(UniqueKey::ShortCode)) if !retried => {
                    tracing::warn!(owner = %owner, "short code collision, regenerating");
                    retried = true;
                }
                Err(StoreError::UniqueViolation(UniqueKey::ShortCode)) => {
                    return Err(AppError::CodeSpaceExhausted);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Resolves a public short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    pub async fn get_by_code(&self, code: &str) -> Result<ShortLink, AppError> {
        self.repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("short link not found"))
    }

    /// Finds the link `owner` created for exactly `original_url`.
    pub async fn get_by_original_url(
        &self,
        owner: Uuid,
        original_url: &str,
    ) -> Result<ShortLink, AppError> {
        self.repository
            .find_by_original_url(owner, original_url.trim())
            .await?
            .ok_or_else(|| AppError::not_found("short link not found"))
    }
}

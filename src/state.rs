//! Shared application state handed to every handler.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;

use crate::application::services::account_service::derive_api_key_secret;
use crate::application::services::{
    AccountService, LinkService, TokenService, VerificationService, VerificationSettings,
};
use crate::config::Config;
use crate::domain::clock::Clock;
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::mail::Mailer;

/// The concrete collaborators a running service is assembled from.
///
/// The server passes PostgreSQL, Redis and an SMTP or log mailer; tests pass
/// in-memory stores and recording mailers.
pub struct Backends {
    pub users: Arc<dyn UserRepository>,
    pub links: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

/// Services and immutable settings shared across requests.
///
/// Cloning is cheap; every service sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<AccountService>,
    pub link_service: Arc<LinkService>,
    pub verification_service: Arc<VerificationService>,
    pub token_service: Arc<TokenService>,
    pub cache: Arc<dyn CacheService>,
    /// Public base URL without trailing slash.
    pub base_url: Arc<str>,
    pub short_code_length: usize,
    pub require_api_version: bool,
}

impl AppState {
    /// Wires services from configuration and backends.
    ///
    /// # Errors
    ///
    /// Fails if `JWT_SECRET` does not decode, or if the signing secret or
    /// token lifetime is rejected by [`TokenService::new`].
    pub fn new(config: &Config, backends: Backends) -> Result<Self> {
        let secret = config.jwt_secret_bytes()?;

        let token_service = TokenService::new(
            &secret,
            Duration::minutes(config.jwt_expire_minutes),
            backends.clock.clone(),
        )
        .context("Invalid token settings")?;

        let api_key_secret =
            derive_api_key_secret(&secret).context("Failed to derive API key secret")?;

        let account_service = Arc::new(AccountService::new(
            backends.users,
            backends.clock.clone(),
            Duration::minutes(config.verification_ttl_minutes),
            api_key_secret,
        ));

        let link_service = LinkService::new(backends.links, backends.clock.clone());

        let verification_service = VerificationService::new(
            account_service.clone(),
            backends.mailer,
            backends.clock,
            VerificationSettings {
                base_url: config.base_url.clone(),
                site_name: config.site_name.clone(),
                mail_timeout: std::time::Duration::from_secs(config.mail_timeout_seconds),
            },
        );

        Ok(Self {
            account_service,
            link_service: Arc::new(link_service),
            verification_service: Arc::new(verification_service),
            token_service: Arc::new(token_service),
            cache: backends.cache,
            base_url: Arc::from(config.base_url.as_str()),
            short_code_length: config.short_code_length,
            require_api_version: config.require_api_version,
        })
    }
}

//! Verification workflow: signup, verification mail and account activation.
//!
//! ```text
//! signup ──> pending ──(valid, unexpired token)──> verified
//! ```
//!
//! Mail is sent after the state change it reports on is stored. A mail
//! failure is reported to the caller but never undoes that change.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::application::services::AccountService;
use crate::domain::clock::Clock;
use crate::domain::entities::User;
use crate::error::AppError;
use crate::infrastructure::mail::{MailError, Mailer, VerificationEmail, WelcomeEmail};

/// Settings the workflow needs to build outbound messages.
#[derive(Debug, Clone)]
pub struct VerificationSettings {
    /// Public base URL without trailing slash.
    pub base_url: String,
    pub site_name: String,
    pub mail_timeout: Duration,
}

pub struct VerificationService {
    accounts: Arc<AccountService>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    settings: VerificationSettings,
}

impl VerificationService {
    pub fn new(
        accounts: Arc<AccountService>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        settings: VerificationSettings,
    ) -> Self {
        Self {
            accounts,
            mailer,
            clock,
            settings,
        }
    }

    /// Creates the account and mails its verification link.
    ///
    /// # Errors
    ///
    /// Everything [`AccountService::create`] returns, plus
    /// [`AppError::Internal`] when the verification mail cannot be sent. The
    /// user row is kept in that case.
    pub async fn signup(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self.accounts.create(email, password).await?;

        let content = VerificationEmail {
            site_name: self.settings.site_name.clone(),
            email: user.email.clone(),
            link: self.verification_link(user.verification_token),
            expires_in_minutes: (user.verification_expires_at - user.created_at).num_minutes(),
        };

        self.with_timeout(self.mailer.send_verification(&user.email, &content))
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "verification mail failed");
                AppError::internal(format!("verification mail failed: {e}"))
            })?;

        Ok(user)
    }

    /// Consumes a verification token and activates its account.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidVerificationToken`] if the token is unknown,
    ///   already used or expired; the account is left unchanged
    /// - [`AppError::Internal`] if the welcome mail fails; the account stays
    ///   verified
    pub async fn verify(&self, token: &str) -> Result<User, AppError> {
        let token =
            Uuid::parse_str(token.trim()).map_err(|_| AppError::InvalidVerificationToken)?;

        let mut user = match self.accounts.get_by_verification_token(token).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => return Err(AppError::InvalidVerificationToken),
            Err(e) => return Err(e),
        };

        if user.verified || user.is_verification_expired(self.clock.now()) {
            return Err(AppError::InvalidVerificationToken);
        }

        // A concurrent request may have consumed the token since the lookup.
        if !self.accounts.set_verified(user.id).await? {
            return Err(AppError::InvalidVerificationToken);
        }
        user.verified = true;
        tracing::info!(user_id = %user.id, "user verified");

        let content = WelcomeEmail {
            site_name: self.settings.site_name.clone(),
            email: user.email.clone(),
            base_url: self.settings.base_url.clone(),
        };

        self.with_timeout(self.mailer.send_welcome(&user.email, &content))
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "welcome mail failed");
                AppError::internal(format!("welcome mail failed: {e}"))
            })?;

        Ok(user)
    }

    fn verification_link(&self, token: Uuid) -> String {
        format!("{}/auth/verify?v={}", self.settings.base_url, token)
    }

    async fn with_timeout(
        &self,
        send: impl Future<Output = Result<(), MailError>>,
    ) -> Result<(), MailError> {
        tokio::time::timeout(self.settings.mail_timeout, send)
            .await
            .map_err(|_| MailError::Timeout)?
    }
}

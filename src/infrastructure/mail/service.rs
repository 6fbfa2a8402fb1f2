//! Mailer trait and error types.

use async_trait::async_trait;

use super::message::{VerificationEmail, WelcomeEmail};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("failed to render mail template: {0}")]
    Render(String),

    #[error("mail delivery failed: {0}")]
    Delivery(String),

    #[error("mail delivery timed out")]
    Timeout,

    #[error("invalid mail configuration: {0}")]
    Config(String),
}

pub type MailResult<T> = Result<T, MailError>;

/// Delivers account notifications.
///
/// Implementations must be thread-safe. Callers bound every send with a
/// timeout, so implementations need not enforce their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the email-address verification message.
    async fn send_verification(&self, to: &str, content: &VerificationEmail) -> MailResult<()>;

    /// Sends the welcome message after a successful verification.
    async fn send_welcome(&self, to: &str, content: &WelcomeEmail) -> MailResult<()>;
}

//! Outbound mail.
//!
//! Provides a [`Mailer`] trait with two implementations:
//! - [`SmtpMailer`] - Delivers through an SMTP relay with mandatory STARTTLS
//! - [`LogMailer`] - Development fallback that only logs the envelope
//!
//! Message bodies are `askama` templates under `templates/`.

mod log_mailer;
mod message;
mod service;
mod smtp_mailer;

pub use log_mailer::LogMailer;
pub use smtp_mailer::{SmtpMailer, SmtpSettings};
pub use message::{VerificationEmail, WelcomeEmail};
pub use service::{MailError, MailResult, Mailer};

#[cfg(test)]
pub use service::MockMailer;

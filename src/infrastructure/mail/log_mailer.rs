//! Mailer that logs outgoing messages instead of delivering them.

use async_trait::async_trait;
use tracing::info;

use super::message::{RenderedMail, VerificationEmail, WelcomeEmail};
use super::service::{MailResult, Mailer};

/// A mailer that renders every message and records that it was sent.
///
/// Development fallback when `SMTP_HOST` is not configured. Only envelope
/// data reaches the log; bodies carry single-use verification links and are
/// never written out.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }

    fn log(&self, kind: &str, to: &str, mail: &RenderedMail) {
        info!(
            from = %self.from,
            to = %to,
            subject = %mail.subject,
            html_bytes = mail.html.len(),
            text_bytes = mail.text.len(),
            "{kind} mail not delivered (log mailer)"
        );
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, to: &str, content: &VerificationEmail) -> MailResult<()> {
        let mail = content.compose()?;
        self.log("verification", to, &mail);
        Ok(())
    }

    async fn send_welcome(&self, to: &str, content: &WelcomeEmail) -> MailResult<()> {
        let mail = content.compose()?;
        self.log("welcome", to, &mail);
        Ok(())
    }
}

//! SMTP delivery via `lettre`.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use super::message::{RenderedMail, VerificationEmail, WelcomeEmail};
use super::service::{MailError, MailResult, Mailer};

/// Connection settings for [`SmtpMailer`].
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    /// Username and password; `None` sends without authentication.
    pub credentials: Option<(String, String)>,
    /// Sender address, optionally with a display name.
    pub from: String,
    /// Bound on connecting and on each SMTP command.
    pub timeout: Duration,
}

/// Delivers mail through an SMTP relay.
///
/// STARTTLS is mandatory: the connection is upgraded before credentials or
/// message data are sent, and a relay without STARTTLS is refused. Every
/// message carries a plain-text body with an HTML alternative.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Builds the transport. No connection is opened until the first send or
    /// [`SmtpMailer::verify_connection`].
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Config`] if the sender address does not parse or
    /// the TLS parameters for `host` cannot be built.
    pub fn new(settings: SmtpSettings) -> MailResult<Self> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e| MailError::Config(format!("MAIL_FROM '{}': {e}", settings.from)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| MailError::Config(format!("SMTP_HOST '{}': {e}", settings.host)))?
            .port(settings.port)
            .timeout(Some(settings.timeout));

        if let Some((username, password)) = settings.credentials {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    /// Opens a connection to the relay and closes it again.
    ///
    /// Called once at startup so a misconfigured relay stops the service
    /// instead of failing every signup.
    pub async fn verify_connection(&self) -> MailResult<()> {
        match self.transport.test_connection().await {
            Ok(true) => {
                info!("SMTP relay reachable");
                Ok(())
            }
            Ok(false) => Err(MailError::Delivery(
                "SMTP relay did not accept the connection".to_string(),
            )),
            Err(e) => Err(MailError::Delivery(e.to_string())),
        }
    }

    async fn deliver(&self, to: &str, mail: RenderedMail) -> MailResult<()> {
        let message = build_message(&self.from, to, mail)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;

        debug!(to = %to, code = %response.code(), "mail accepted by relay");
        Ok(())
    }
}

/// Assembles a `multipart/alternative` message from a rendered mail.
fn build_message(from: &Mailbox, to: &str, mail: RenderedMail) -> MailResult<Message> {
    let to: Mailbox = to
        .parse()
        .map_err(|e| MailError::Delivery(format!("invalid recipient '{to}': {e}")))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(mail.subject)
        .multipart(MultiPart::alternative_plain_html(mail.text, mail.html))
        .map_err(|e| MailError::Delivery(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification(&self, to: &str, content: &VerificationEmail) -> MailResult<()> {
        self.deliver(to, content.compose()?).await
    }

    async fn send_welcome(&self, to: &str, content: &WelcomeEmail) -> MailResult<()> {
        self.deliver(to, content.compose()?).await
    }
}

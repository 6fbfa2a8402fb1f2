//! Mail message bodies.
//!
//! Every message has an HTML body and a plain-text alternative, rendered from
//! `templates/<name>.html` and `templates/<name>.txt`.

use askama::Template;

use super::service::MailError;

#[derive(Debug, Clone, Template)]
#[template(path = "verify.html")]
pub struct VerificationEmail {
    pub site_name: String,
    pub email: String,
    pub link: String,
    pub expires_in_minutes: i64,
}

impl VerificationEmail {
    pub fn subject(&self) -> String {
        format!("Confirm your {} account", self.site_name)
    }

    pub(super) fn compose(&self) -> Result<RenderedMail, MailError> {
        let text = VerificationText {
            site_name: &self.site_name,
            email: &self.email,
            link: &self.link,
            expires_in_minutes: self.expires_in_minutes,
        };

        Ok(RenderedMail {
            subject: self.subject(),
            html: render(self)?,
            text: render(&text)?,
        })
    }
}

#[derive(Template)]
#[template(path = "verify.txt")]
struct VerificationText<'a> {
    site_name: &'a str,
    email: &'a str,
    link: &'a str,
    expires_in_minutes: i64,
}

#[derive(Debug, Clone, Template)]
#[template(path = "welcome.html")]
pub struct WelcomeEmail {
    pub site_name: String,
    pub email: String,
    pub base_url: String,
}

impl WelcomeEmail {
    pub fn subject(&self) -> String {
        format!("Welcome to {}", self.site_name)
    }

    pub(super) fn compose(&self) -> Result<RenderedMail, MailError> {
        let text = WelcomeText {
            site_name: &self.site_name,
            email: &self.email,
            base_url: &self.base_url,
        };

        Ok(RenderedMail {
            subject: self.subject(),
            html: render(self)?,
            text: render(&text)?,
        })
    }
}

#[derive(Template)]
#[template(path = "welcome.txt")]
struct WelcomeText<'a> {
    site_name: &'a str,
    email: &'a str,
    base_url: &'a str,
}

/// A message rendered into both of its MIME alternatives.
#[derive(Debug, Clone)]
pub(super) struct RenderedMail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Renders a template, mapping template failures into [`MailError`].
pub(super) fn render(template: &impl Template) -> Result<String, MailError> {
    template.render().map_err(|e| MailError::Render(e.to_string()))
}

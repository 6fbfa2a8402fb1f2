//! Validation of URLs submitted for shortening.
//!
//! The submitted string is stored verbatim so that redirects return exactly
//! what was shortened; this module only decides whether it is acceptable.

use url::Url;

/// Errors that can occur during URL validation.
#[derive(Debug, thiserror::Error)]
pub enum UrlValidationError {
    #[error("url must not be empty")]
    Empty,

    #[error("invalid url format: {0}")]
    InvalidFormat(String),

    #[error("only http and https urls can be shortened")]
    UnsupportedProtocol,

    #[error("url must include a host")]
    MissingHost,

    #[error("url must not contain control characters")]
    ControlCharacter,
}

/// Checks that `input` is an absolute HTTP(S) URL with a host.
///
/// Rejects `javascript:`, `data:`, `file:` and other non-web schemes, and any
/// input containing control characters. The parser would percent-encode those,
/// but the raw string is what ends up in the `Location` header.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_url("https://example.com/x").is_ok());
/// assert!(validate_url("javascript:alert(1)").is_err());
/// ```
pub fn validate_url(input: &str) -> Result<(), UrlValidationError> {
    if input.trim().is_empty() {
        return Err(UrlValidationError::Empty);
    }

    if input.chars().any(char::is_control) {
        return Err(UrlValidationError::ControlCharacter);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}

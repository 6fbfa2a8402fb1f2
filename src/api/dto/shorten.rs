//! DTOs for the link shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// Absolute http(s) URL; stored exactly as given after trimming.
    #[validate(length(min = 1, max = 8192, message = "url is required"))]
    pub url: String,
}

/// The public short link, `<base>/<code>`.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub link: String,
}

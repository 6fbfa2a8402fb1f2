//! Short link entity mapping a public code to an original URL.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub id: Uuid,
    /// Owning user; links are removed together with their owner.
    pub owner: Uuid,
    /// The URL exactly as submitted.
    pub original_url: String,
    pub short_code: String,
    /// Not maintained by this service.
    pub visit_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShortLink {
    /// Public short URL under `base_url` (which carries no trailing slash).
    pub fn public_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url, self.short_code)
    }
}

/// Input data for inserting a new short link.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub id: Uuid,
    pub owner: Uuid,
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
}

impl NewShortLink {
    pub fn into_short_link(self) -> ShortLink {
        ShortLink {
            id: self.id,
            owner: self.owner,
            original_url: self.original_url,
            short_code: self.short_code,
            visit_count: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

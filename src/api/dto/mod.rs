//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization; request bodies
//! additionally derive `validator::Validate`.

pub mod auth;
pub mod health;
pub mod shorten;

//! HTTP middleware for request processing.
//!
//! Provides bearer authentication, API version gating and request tracing.

pub mod api_version;
pub mod auth;
pub mod tracing;

pub use auth::AuthenticatedUser;

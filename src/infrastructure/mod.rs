//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of the interfaces the domain and application
//! layers depend on.
//!
//! # Modules
//!
//! - [`cache`] - Redirect cache (Redis and no-op implementations)
//! - [`mail`] - Outbound account mail
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod mail;
pub mod persistence;

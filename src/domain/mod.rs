//! Domain layer: entities, repository contracts and the clock.
//!
//! Nothing in here depends on PostgreSQL, Redis or HTTP. Services in
//! [`crate::application::services`] work against these types, and
//! [`crate::infrastructure`] provides the concrete backends.
//!
//! - [`entities`] - Users and short links
//! - [`repositories`] - Data access traits and the store error taxonomy
//! - [`clock`] - Injectable wall clock

pub mod clock;
pub mod entities;
pub mod repositories;

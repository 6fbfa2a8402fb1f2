//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access following the Repository pattern.
//! Concrete implementations live in `crate::infrastructure::persistence`;
//! mock implementations are generated via `mockall` for unit tests.
//!
//! Uniqueness is enforced by the backend, never by read-then-write checks in
//! the services. Backends report conflicts through [`StoreError`].
//!
//! # Available Repositories
//!
//! - [`UserRepository`] - Account records
//! - [`LinkRepository`] - Short link records

pub mod error;
pub mod link_repository;
pub mod user_repository;

pub use error::{StoreError, StoreResult, UniqueKey};
pub use link_repository::LinkRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;

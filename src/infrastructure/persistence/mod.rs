//! PostgreSQL repository implementations.
//!
//! Concrete implementations of the domain repository traits using SQLx.
//! Each repository classifies its own driver errors into
//! [`StoreError`](crate::domain::repositories::StoreError).
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - Account storage
//! - [`PgLinkRepository`] - Short link storage

mod pg_error;
pub mod pg_link_repository;
pub mod pg_user_repository;

pub use pg_link_repository::PgLinkRepository;
pub use pg_user_repository::PgUserRepository;

//! Core domain entities.
//!
//! - [`User`] - A registered account
//! - [`ShortLink`] - A short code mapped to an original URL
//!
//! Each entity has a companion `New*` struct carrying the fields supplied at
//! insertion time.

pub mod short_link;
pub mod user;

pub use short_link::{NewShortLink, ShortLink};
pub use user::{NewUser, User};

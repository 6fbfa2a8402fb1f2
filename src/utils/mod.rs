//! Utility functions shared across layers.
//!
//! - [`id_generator`] - Random IDs, verification tokens and short codes
//! - [`url_validator`] - Acceptance rules for URLs submitted for shortening
//! - [`password`] - Argon2 password hashing

pub mod id_generator;
pub mod password;
pub mod url_validator;

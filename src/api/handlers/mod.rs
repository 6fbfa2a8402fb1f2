//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod auth;
pub mod health;
pub mod redirect;
pub mod shorten;

pub use auth::{login_handler, signup_handler, verify_handler};
pub use health::{health_handler, ping_handler};
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;

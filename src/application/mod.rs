//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, validation and business rules, and
//! give HTTP handlers a narrow API. They hold repositories as trait objects so
//! tests can swap in mocks or in-memory stores.
//!
//! # Available Services
//!
//! - [`services::token_service::TokenService`] - Signed session tokens
//! - [`services::account_service::AccountService`] - User records and credentials
//! - [`services::link_service::LinkService`] - Short link creation and resolution
//! - [`services::verification_service::VerificationService`] - Signup and email verification

pub mod services;

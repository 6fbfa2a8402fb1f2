//! Business logic services for the application layer.

pub mod account_service;
pub mod link_service;
pub mod token_service;
pub mod verification_service;

pub use account_service::AccountService;
pub use link_service::LinkService;
pub use token_service::{TokenError, TokenService, VerifiedToken};
pub use verification_service::{VerificationService, VerificationSettings};

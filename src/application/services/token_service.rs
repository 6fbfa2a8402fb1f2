//! Signed session tokens.
//!
//! Tokens are HMAC-signed JWTs carrying the user ID as subject together with
//! issued-at, expiry and issuer claims. There is no revocation list; expiry is
//! the only way a token stops being valid.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::clock::Clock;

/// Fixed `iss` claim of every token this service issues.
pub const ISSUER: &str = "linkward";

/// Minimum accepted length of the signing secret in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("signing secret must be at least {MIN_SECRET_LEN} bytes")]
    WeakSecret,

    #[error("token lifetime must be positive")]
    InvalidTtl,

    #[error("invalid token signature or algorithm")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token claims are missing or invalid")]
    MalformedClaims,

    #[error("token is not a well-formed JWT")]
    Malformed,

    #[error("failed to sign token: {0}")]
    Encoding(String),
}

/// Claims as they appear on the wire.
///
/// Every field is optional on decode so that a missing claim surfaces as
/// [`TokenError::MalformedClaims`] rather than a parse failure.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
}

/// Identity recovered from a valid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
}

/// Issues and validates session tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Creates a token service.
    ///
    /// # Errors
    ///
    /// [`TokenError::WeakSecret`] if `secret` is shorter than
    /// [`MIN_SECRET_LEN`] bytes, [`TokenError::InvalidTtl`] if `ttl` is not
    /// strictly positive.
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret);
        }
        if ttl <= Duration::zero() {
            return Err(TokenError::InvalidTtl);
        }

        // Accept the HMAC family only; anything else in the header is rejected
        // before the signature is looked at.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user_id` valid for the configured lifetime.
    pub fn encode(&self, user_id: Uuid) -> Result<String, TokenError> {
        let now = self.clock.now();

        let claims = Claims {
            sub: Some(user_id.to_string()),
            iat: Some(now.timestamp()),
            exp: Some((now + self.ttl).timestamp()),
            iss: Some(ISSUER.to_string()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Validates `token` and returns the identity it carries.
    ///
    /// Checks run in order: algorithm and signature, expiry, then the
    /// presence and shape of `sub`, `iat` and `iss`.
    pub fn decode(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed,
            },
        )?;
        let claims = data.claims;

        let exp = claims.exp.ok_or(TokenError::MalformedClaims)?;
        if self.clock.now().timestamp() >= exp {
            return Err(TokenError::Expired);
        }

        let user_id = claims
            .sub
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or(TokenError::MalformedClaims)?;

        let issued_at = claims
            .iat
            .filter(|&iat| iat > 0)
            .and_then(|iat| DateTime::from_timestamp(iat, 0))
            .ok_or(TokenError::MalformedClaims)?;

        match claims.iss.as_deref() {
            Some(ISSUER) => {}
            _ => return Err(TokenError::MalformedClaims),
        }

        Ok(VerifiedToken { user_id, issued_at })
    }
}

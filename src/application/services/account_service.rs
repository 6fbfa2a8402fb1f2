//! Account directory: user creation, lookup and credential checks.

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Duration;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::domain::clock::Clock;
use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::{StoreError, UniqueKey, UserRepository};
use crate::error::AppError;
use crate::utils::id_generator::{new_id, random_bytes};
use crate::utils::password::{hash_password, verify_password};

type HmacSha256 = Hmac<Sha256>;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Raw API key length in bytes before encoding.
const API_KEY_BYTES: usize = 32;

/// Label mixed into the signing secret to obtain the API key digest key.
const API_KEY_DERIVATION_LABEL: &[u8] = b"linkward api-key digest v1";

/// Derives the API key digest key from the token signing secret.
///
/// Keeps the two uses of the secret apart: a token signature can never be
/// replayed as an API key digest or the other way round.
pub fn derive_api_key_secret(signing_secret: &[u8]) -> Result<Vec<u8>, AppError> {
    let mut mac = HmacSha256::new_from_slice(signing_secret)
        .map_err(|e| AppError::internal(e.to_string()))?;
    mac.update(API_KEY_DERIVATION_LABEL);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Owns user records and the rules around them.
///
/// Email uniqueness is left to the repository's constraint: `create` inserts
/// directly and reads the conflict back from the store error.
pub struct AccountService {
    repository: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
    verification_ttl: Duration,
    api_key_secret: Vec<u8>,
}

impl AccountService {
    /// Creates a new account service.
    ///
    /// # Arguments
    ///
    /// - `repository` - user storage
    /// - `clock` - source of creation and expiry timestamps
    /// - `verification_ttl` - how long a verification token stays valid
    /// - `api_key_secret` - HMAC key for API key digests, see
    ///   [`derive_api_key_secret`]
    pub fn new(
        repository: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
        verification_ttl: Duration,
        api_key_secret: Vec<u8>,
    ) -> Self {
        Self {
            repository,
            clock,
            verification_ttl,
            api_key_secret,
        }
    }

    /// Registers a new, unverified user.
    ///
    /// Email and password are trimmed before use. The verification token
    /// expires `verification_ttl` after creation.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a malformed email or a password outside
    ///   the accepted length
    /// - [`AppError::DuplicateEmail`] when the address is already registered
    /// - [`AppError::Internal`] for any other storage or entropy failure
    pub async fn create(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = email.trim().to_string();
        let password = password.trim().to_string();

        if !email.validate_email() {
            return Err(AppError::validation("invalid email"));
        }
        if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password.chars().count()) {
            return Err(AppError::validation(format!(
                "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
            )));
        }

        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(e.to_string()))?;

        let now = self.clock.now();
        let new_user = NewUser {
            id: new_id()?,
            email,
            password_hash,
            verification_token: new_id()?,
            verification_expires_at: now + self.verification_ttl,
            created_at: now,
        };

        match self.repository.create(new_user).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "user created");
                Ok(user)
            }
            Err(StoreError::UniqueViolation(UniqueKey::Email)) => Err(AppError::DuplicateEmail),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User, AppError> {
        self.repository
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    pub async fn get_by_verification_token(&self, token: Uuid) -> Result<User, AppError> {
        self.repository
            .find_by_verification_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    /// Marks a user verified.
    ///
    /// Returns whether this call made the transition; verifying an already
    /// verified user is a no-op.
    pub async fn set_verified(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.repository.set_verified(id, self.clock.now()).await?)
    }

    /// Stores `api_key` (already digested) for the user.
    pub async fn set_api_key(&self, id: Uuid, api_key: &str) -> Result<(), AppError> {
        Ok(self
            .repository
            .set_api_key(id, api_key, self.clock.now())
            .await?)
    }

    /// Issues a fresh API key for the user, replacing any previous one.
    ///
    /// The returned key is shown once; only its HMAC-SHA256 digest is stored.
    pub async fn issue_api_key(&self, id: Uuid) -> Result<String, AppError> {
        let key = URL_SAFE_NO_PAD.encode(random_bytes(API_KEY_BYTES)?);
        let digest = self.digest_api_key(&key)?;

        self.set_api_key(id, &digest).await?;
        tracing::info!(user_id = %id, "api key issued");

        Ok(key)
    }

    /// Hex-encoded HMAC-SHA256 of a raw API key under the server secret.
    pub fn digest_api_key(&self, key: &str) -> Result<String, AppError> {
        let mut mac = HmacSha256::new_from_slice(&self.api_key_secret)
            .map_err(|e| AppError::internal(e.to_string()))?;
        mac.update(key.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Checks `candidate` against a stored password hash.
    ///
    /// A mismatch is `Ok(false)`, not an error.
    pub async fn compare(&self, hash: &str, candidate: &str) -> Result<bool, AppError> {
        let hash = hash.to_string();
        let candidate = candidate.to_string();

        tokio::task::spawn_blocking(move || verify_password(&hash, &candidate))
            .await
            .map_err(|e| AppError::internal(format!("password check task failed: {e}")))?
            .map_err(|e| AppError::internal(e.to_string()))
    }

    /// Round-trips to the user store; used by the health check.
    pub async fn ping(&self) -> Result<(), AppError> {
        Ok(self.repository.ping().await?)
    }

    /// Resolves an email/password pair to a user.
    ///
    /// Unknown email and wrong password both yield
    /// [`AppError::InvalidCredentials`]. Verification is not required.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .repository
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.compare(&user.password_hash, password.trim()).await? {
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::SystemClock;
    use crate::domain::repositories::MockUserRepository;
    use chrono::Utc;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn service(repo: MockUserRepository) -> AccountService {
        AccountService::new(
            Arc::new(repo),
            Arc::new(SystemClock),
            Duration::minutes(60),
            SECRET.to_vec(),
        )
    }

    fn stored_user(email: &str, password: &str) -> User {
        let now = Utc::now();
        NewUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            verification_token: Uuid::new_v4(),
            verification_expires_at: now + Duration::minutes(60),
            created_at: now,
        }
        .into_user()
    }

    #[tokio::test]
    async fn test_create_trims_and_hashes() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .withf(|u| {
                u.email == "a@example.com"
                    && u.password_hash.starts_with("$argon2")
                    && verify_password(&u.password_hash, "str0ngpa55w0rd").unwrap()
            })
            .times(1)
            .returning(|u| Ok(u.into_user()));

        let user = service(repo)
            .create("  a@example.com ", " str0ngpa55w0rd\n")
            .await
            .unwrap();

        assert_eq!(user.email, "a@example.com");
        assert!(!user.verified);
    }

    #[tokio::test]
    async fn test_create_sets_verification_window() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().returning(|u| Ok(u.into_user()));

        let user = service(repo)
            .create("a@example.com", "str0ngpa55w0rd")
            .await
            .unwrap();

        assert_eq!(
            user.verification_expires_at - user.created_at,
            Duration::minutes(60)
        );
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .returning(|_| Err(StoreError::UniqueViolation(UniqueKey::Email)));

        let result = service(repo).create("a@example.com", "str0ngpa55w0rd").await;

        assert!(matches!(result, Err(AppError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_create_other_violation_is_internal() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .returning(|_| Err(StoreError::UniqueViolation(UniqueKey::VerificationToken)));

        let result = service(repo).create("a@example.com", "str0ngpa55w0rd").await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let repo = MockUserRepository::new();
        let service = service(repo);

        assert!(matches!(
            service.create("not-an-email", "str0ngpa55w0rd").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.create("a@example.com", "   short   ").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let result = service(repo).get_by_id(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_api_key_unknown_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_set_api_key()
            .returning(|_, _, _| Err(StoreError::NotFound));

        let result = service(repo).set_api_key(Uuid::new_v4(), "digest").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_issue_api_key_stores_digest_only() {
        let mut repo = MockUserRepository::new();
        let stored = Arc::new(std::sync::Mutex::new(String::new()));
        let captured = stored.clone();
        repo.expect_set_api_key().times(1).returning(move |_, key, _| {
            *captured.lock().unwrap() = key.to_string();
            Ok(())
        });

        let service = service(repo);
        let key = service.issue_api_key(Uuid::new_v4()).await.unwrap();

        let digest = stored.lock().unwrap().clone();
        assert_ne!(digest, key);
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, service.digest_api_key(&key).unwrap());
        assert_eq!(URL_SAFE_NO_PAD.decode(&key).unwrap().len(), API_KEY_BYTES);
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let user = stored_user("a@example.com", "str0ngpa55w0rd");
        let expected_id = user.id;
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .withf(|email| email == "a@example.com")
            .returning(move |_| Ok(Some(user.clone())));

        let result = service(repo)
            .authenticate("a@example.com", "str0ngpa55w0rd")
            .await
            .unwrap();

        assert_eq!(result.id, expected_id);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password_and_unknown_email_match() {
        let user = stored_user("a@example.com", "str0ngpa55w0rd");
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |email| Ok((email == "a@example.com").then(|| user.clone())));

        let service = service(repo);
        let wrong_password = service
            .authenticate("a@example.com", "wrong-password")
            .await
            .unwrap_err();
        let unknown_email = service
            .authenticate("b@example.com", "str0ngpa55w0rd")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_compare_mismatch_is_not_error() {
        let service = service(MockUserRepository::new());
        let hash = hash_password("str0ngpa55w0rd").unwrap();

        assert!(!service.compare(&hash, "nope").await.unwrap());
        assert!(service.compare(&hash, "str0ngpa55w0rd").await.unwrap());
    }

    #[test]
    fn test_api_key_secret_is_derived_not_reused() {
        let derived = derive_api_key_secret(SECRET).unwrap();

        assert_ne!(derived.as_slice(), SECRET);
        assert_eq!(derived, derive_api_key_secret(SECRET).unwrap());
        assert_ne!(derived, derive_api_key_secret(b"another signing secret").unwrap());
    }

    #[test]
    fn test_digest_differs_from_raw_signing_secret_hmac() {
        let service = AccountService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(SystemClock),
            Duration::minutes(60),
            derive_api_key_secret(SECRET).unwrap(),
        );

        let mut raw = HmacSha256::new_from_slice(SECRET).unwrap();
        raw.update(b"lw_some-key");
        let raw_digest = hex::encode(raw.finalize().into_bytes());

        assert_ne!(service.digest_api_key("lw_some-key").unwrap(), raw_digest);
    }
}

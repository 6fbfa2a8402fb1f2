//! Store error taxonomy.
//!
//! Backends classify their own driver errors into [`StoreError`] so that
//! services can react to uniqueness conflicts without knowing which database
//! produced them.

/// The uniqueness constraint that rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    Email,
    ApiKey,
    VerificationToken,
    ShortCode,
    /// The `(owner, original_url)` pair.
    OriginalUrl,
    /// A constraint the backend could not attribute.
    Other,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0:?}")]
    UniqueViolation(UniqueKey),

    #[error("record not found")]
    NotFound,

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend(message.into())
    }

    /// Returns the violated key if this is a uniqueness conflict.
    pub fn unique_key(&self) -> Option<UniqueKey> {
        match self {
            StoreError::UniqueViolation(key) => Some(*key),
            _ => None,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

//! Classification of PostgreSQL errors into [`StoreError`].

use crate::domain::repositories::{StoreError, UniqueKey};

/// Maps a unique constraint name from the schema to the key it protects.
fn unique_key_for(constraint: &str) -> UniqueKey {
    match constraint {
        "users_email_key" => UniqueKey::Email,
        "users_api_key_key" => UniqueKey::ApiKey,
        "users_verification_token_key" => UniqueKey::VerificationToken,
        "urls_short_code_key" => UniqueKey::ShortCode,
        "urls_owner_original_url_key" => UniqueKey::OriginalUrl,
        _ => UniqueKey::Other,
    }
}

/// Converts a driver error into the store taxonomy.
///
/// Unique violations are attributed by constraint name; every other error is
/// a backend failure.
pub(crate) fn classify(e: sqlx::Error) -> StoreError {
    if let Some(db_err) = e.as_database_error()
        && db_err.is_unique_violation()
    {
        let key = db_err.constraint().map_or(UniqueKey::Other, unique_key_for);
        return StoreError::UniqueViolation(key);
    }

    match e {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::backend(other.to_string()),
    }
}

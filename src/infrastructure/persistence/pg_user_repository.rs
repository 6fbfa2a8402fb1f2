//! PostgreSQL implementation of the user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use super::pg_error::classify;
use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::{StoreError, StoreResult, UserRepository};

const USER_COLUMNS: &str = "id, email, password, api_key, verification_token, \
     verification_expires, verified, created_at, updated_at";

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password: String,
    api_key: Option<String>,
    verification_token: Uuid,
    verification_expires: DateTime<Utc>,
    verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password,
            api_key: row.api_key,
            verification_token: row.verification_token,
            verification_expires_at: row.verification_expires,
            verified: row.verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL repository for user accounts.
///
/// Uniqueness violations are classified by constraint name, see
/// [`classify`](super::pg_error::classify).
pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn find_one<'q>(
        &self,
        query: sqlx::query::QueryAs<'q, sqlx::Postgres, UserRow, sqlx::postgres::PgArguments>,
    ) -> StoreResult<Option<User>> {
        let row = query
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(classify)?;

        Ok(row.map(User::from))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (id, email, password, verification_token, verification_expires, \
             verified, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, FALSE, $6, $6) \
             RETURNING {USER_COLUMNS}"
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(new_user.id)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(new_user.verification_token)
            .bind(new_user.verification_expires_at)
            .bind(new_user.created_at)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(classify)?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        self.find_one(sqlx::query_as(&sql).bind(id)).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        self.find_one(sqlx::query_as(&sql).bind(email)).await
    }

    async fn find_by_verification_token(&self, token: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE verification_token = $1");
        self.find_one(sqlx::query_as(&sql).bind(token)).await
    }

    async fn set_verified(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET verified = TRUE, updated_at = $2 WHERE id = $1 AND verified = FALSE",
        )
        .bind(id)
        .bind(at)
        .execute(self.pool.as_ref())
        .await
        .map_err(classify)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(classify)?;

        if exists {
            Ok(false)
        } else {
            Err(StoreError::NotFound)
        }
    }

    async fn set_api_key(&self, id: Uuid, api_key: &str, at: DateTime<Utc>) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET api_key = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(api_key)
            .bind(at)
            .execute(self.pool.as_ref())
            .await
            .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map_err(classify)?;

        Ok(())
    }
}

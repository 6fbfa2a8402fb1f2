//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use super::pg_error::classify;
use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::{LinkRepository, StoreResult};

#[derive(FromRow)]
struct LinkRow {
    id: Uuid,
    owner: Uuid,
    original_url: String,
    short_code: String,
    visit_count: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for ShortLink {
    fn from(row: LinkRow) -> Self {
        ShortLink {
            id: row.id,
            owner: row.owner,
            original_url: row.original_url,
            short_code: row.short_code,
            visit_count: row.visit_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL repository for short links.
///
/// `create` is a plain `INSERT`; conflicts on `urls_short_code_key` and
/// `urls_owner_original_url_key` come back as classified unique violations.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> StoreResult<ShortLink> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO urls (id, owner, original_url, short_code, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, owner, original_url, short_code, visit_count, created_at, updated_at
            "#,
        )
        .bind(new_link.id)
        .bind(new_link.owner)
        .bind(&new_link.original_url)
        .bind(&new_link.short_code)
        .bind(new_link.created_at)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(classify)?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> StoreResult<Option<ShortLink>> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, owner, original_url, short_code, visit_count, created_at, updated_at
            FROM urls
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(classify)?;

        Ok(row.map(ShortLink::from))
    }

    async fn find_by_original_url(
        &self,
        owner: Uuid,
        original_url: &str,
    ) -> StoreResult<Option<ShortLink>> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, owner, original_url, short_code, visit_count, created_at, updated_at
            FROM urls
            WHERE owner = $1 AND original_url = $2
            "#,
        )
        .bind(owner)
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(classify)?;

        Ok(row.map(ShortLink::from))
    }
}

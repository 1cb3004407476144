//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, LinkTotals, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for link storage and retrieval.
///
/// Uses SQLx prepared statements for SQL injection protection and type safety.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    user_id: i64,
    url: String,
    short_code: String,
    is_alias: bool,
    clicked: i64,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link::new(
            r.id,
            r.user_id,
            r.url,
            r.short_code,
            r.is_alias,
            r.clicked,
            r.updated_at,
        )
    }
}

/// Maps a unique violation on `short_code` to the user-facing conflict.
fn code_conflict(e: sqlx::Error, code: &str) -> AppError {
    match AppError::from(e) {
        AppError::Conflict { .. } => {
            AppError::conflict("alias not available", json!({ "alias": code }))
        }
        other => other,
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (user_id, url, short_code, is_alias)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, url, short_code, is_alias, clicked, updated_at
            "#,
        )
        .bind(new_link.user_id)
        .bind(&new_link.url)
        .bind(&new_link.short_code)
        .bind(new_link.is_alias)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| code_conflict(e, &new_link.short_code))?;

        Ok(row.into())
    }

    async fn insert_pending(&self, user_id: i64, url: &str) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO links (user_id, url, short_code, is_alias) VALUES ($1, $2, NULL, FALSE) RETURNING id",
        )
        .bind(user_id)
        .bind(url)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(id)
    }

    async fn set_code(
        &self,
        id: i64,
        code: &str,
        is_alias: bool,
    ) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            UPDATE links
            SET short_code = $2, is_alias = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, url, short_code, is_alias, clicked, updated_at
            "#,
        )
        .bind(id)
        .bind(code)
        .bind(is_alias)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| code_conflict(e, code))?;

        Ok(row.map(Link::from))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, user_id, url, short_code, is_alias, clicked, updated_at
            FROM links
            WHERE id = $1 AND short_code IS NOT NULL
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, user_id, url, short_code, is_alias, clicked, updated_at
            FROM links
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM links WHERE short_code = $1)",
        )
        .bind(code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn list_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, user_id, url, short_code, is_alias, clicked, updated_at
            FROM links
            WHERE user_id = $1 AND short_code IS NOT NULL
            ORDER BY id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn count_by_user(&self, user_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM links WHERE user_id = $1 AND short_code IS NOT NULL",
        )
        .bind(user_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_click(&self, code: &str) -> Result<Option<String>, AppError> {
        let url = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE links
            SET clicked = clicked + 1
            WHERE short_code = $1
            RETURNING url
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(url)
    }

    async fn totals(&self) -> Result<LinkTotals, AppError> {
        let (links, clicks) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COALESCE(SUM(clicked), 0)::BIGINT FROM links WHERE short_code IS NOT NULL",
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(LinkTotals { links, clicks })
    }
}

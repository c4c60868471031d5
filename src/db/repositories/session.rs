//! Session repository
//!
//! Tokens are not unique: logout removes every row carrying the presented
//! token. Expired rows are left in place until `delete_expired` runs.

use super::{format_timestamp, parse_timestamp};
use crate::db::DynDatabasePool;
use crate::models::Session;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new session
    async fn create(&self, user_id: &str, token: &str, expires_at: DateTime<Utc>) -> Result<Session>;

    /// Most recent session carrying `token`, expired or not
    async fn get_by_token(&self, token: &str) -> Result<Option<Session>>;

    /// Delete every session with this token
    async fn delete_by_token(&self, token: &str) -> Result<u64>;

    /// Delete every session of a user
    async fn delete_by_user(&self, user_id: &str) -> Result<u64>;

    /// Delete sessions whose expiry has passed
    async fn delete_expired(&self) -> Result<u64>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository {
    pool: DynDatabasePool,
}

impl SqlxSessionRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, user_id: &str, token: &str, expires_at: DateTime<Utc>) -> Result<Session> {
        create_session(self.pool.as_sqlite(), user_id, token, expires_at).await
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<Session>> {
        get_session_by_token(self.pool.as_sqlite(), token).await
    }

    async fn delete_by_token(&self, token: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(self.pool.as_sqlite())
            .await
            .context("Failed to delete session")?;
        Ok(result.rows_affected())
    }

    async fn delete_by_user(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool.as_sqlite())
            .await
            .context("Failed to delete sessions by user")?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self) -> Result<u64> {
        delete_expired_sessions(self.pool.as_sqlite()).await
    }
}

async fn create_session(
    pool: &SqlitePool,
    user_id: &str,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<Session> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO sessions (token, user_id, expires_at, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(token)
    .bind(user_id)
    .bind(format_timestamp(&expires_at))
    .bind(format_timestamp(&now))
    .execute(pool)
    .await
    .context("Failed to create session")?;

    Ok(Session {
        id: result.last_insert_rowid(),
        token: token.to_string(),
        user_id: user_id.to_string(),
        expires_at,
        created_at: now,
    })
}

async fn get_session_by_token(pool: &SqlitePool, token: &str) -> Result<Option<Session>> {
    let row = sqlx::query(
        r#"
        SELECT id, token, user_id, expires_at, created_at
        FROM sessions
        WHERE token = ?
        ORDER BY id DESC
        LIMIT 1
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await
    .context("Failed to get session by token")?;

    match row {
        Some(row) => Ok(Some(row_to_session(&row)?)),
        None => Ok(None),
    }
}

// Stored expiries may carry different offsets or none at all, so the
// comparison happens on parsed instants rather than in SQL.
async fn delete_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let rows = sqlx::query("SELECT id, expires_at FROM sessions")
        .fetch_all(pool)
        .await
        .context("Failed to scan sessions")?;

    let now = Utc::now();
    let mut deleted = 0;
    for row in rows {
        let expires_at: String = row.get("expires_at");
        let expired = parse_timestamp(&expires_at).map(|ts| now >= ts).unwrap_or(true);
        if expired {
            let id: i64 = row.get("id");
            deleted += sqlx::query("DELETE FROM sessions WHERE id = ?")
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete expired session")?
                .rows_affected();
        }
    }
    Ok(deleted)
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<Session> {
    let expires_at: String = row.get("expires_at");
    let created_at: String = row.get("created_at");

    Ok(Session {
        id: row.get("id"),
        token: row.get("token"),
        user_id: row.get("user_id"),
        expires_at: parse_timestamp(&expires_at)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Duration;

    async fn setup_test_repo() -> (DynDatabasePool, SqlxSessionRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxSessionRepository::new(pool.clone());
        (pool, repo)
    }

    #[tokio::test]
    async fn test_create_and_get_by_token() {
        let (_pool, repo) = setup_test_repo().await;
        let expires = Utc::now() + Duration::days(7);
        let created = repo.create("user_1", "sess_abc", expires).await.unwrap();
        assert!(created.id > 0);

        let found = repo.get_by_token("sess_abc").await.unwrap().expect("session");
        assert_eq!(found.user_id, "user_1");
        assert!((found.expires_at - expires).abs() < Duration::milliseconds(1));
        assert!(repo.get_by_token("sess_missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_naive_stored_expiry_reads_as_utc() {
        let (pool, repo) = setup_test_repo().await;
        sqlx::query(
            "INSERT INTO sessions (token, user_id, expires_at, created_at) VALUES ('sess_naive', 'user_1', '2020-01-01T10:00:00', '2019-12-25T10:00:00')",
        )
        .execute(pool.as_sqlite())
        .await
        .unwrap();

        let session = repo.get_by_token("sess_naive").await.unwrap().unwrap();
        assert_eq!(session.expires_at.to_rfc3339(), "2020-01-01T10:00:00+00:00");
        assert!(session.is_expired());
    }

    #[tokio::test]
    async fn test_delete_by_token_removes_all_copies() {
        let (_pool, repo) = setup_test_repo().await;
        let expires = Utc::now() + Duration::days(7);
        repo.create("user_1", "sess_dup", expires).await.unwrap();
        repo.create("user_1", "sess_dup", expires).await.unwrap();
        repo.create("user_1", "sess_other", expires).await.unwrap();

        assert_eq!(repo.delete_by_token("sess_dup").await.unwrap(), 2);
        assert!(repo.get_by_token("sess_dup").await.unwrap().is_none());
        assert!(repo.get_by_token("sess_other").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_by_user() {
        let (_pool, repo) = setup_test_repo().await;
        let expires = Utc::now() + Duration::days(7);
        repo.create("user_1", "sess_1", expires).await.unwrap();
        repo.create("user_1", "sess_2", expires).await.unwrap();
        repo.create("user_2", "sess_3", expires).await.unwrap();

        assert_eq!(repo.delete_by_user("user_1").await.unwrap(), 2);
        assert!(repo.get_by_token("sess_1").await.unwrap().is_none());
        assert!(repo.get_by_token("sess_3").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_expired_sessions() {
        let (_pool, repo) = setup_test_repo().await;
        let now = Utc::now();
        repo.create("user_1", "sess_old", now - Duration::days(1)).await.unwrap();
        repo.create("user_1", "sess_new", now + Duration::days(7)).await.unwrap();

        assert_eq!(repo.delete_expired().await.unwrap(), 1);
        assert!(repo.get_by_token("sess_old").await.unwrap().is_none());
        assert!(repo.get_by_token("sess_new").await.unwrap().is_some());
    }
}

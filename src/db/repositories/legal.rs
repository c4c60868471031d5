//! Legal content repository, one row per kind

use super::{format_timestamp, parse_timestamp};
use crate::db::DynDatabasePool;
use crate::models::{LegalContent, LegalKind};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

#[async_trait]
pub trait LegalRepository: Send + Sync {
    async fn get(&self, kind: LegalKind) -> Result<Option<LegalContent>>;

    /// Insert or replace the text for `content.kind`
    async fn upsert(&self, content: &LegalContent) -> Result<LegalContent>;
}

pub struct SqlxLegalRepository {
    pool: DynDatabasePool,
}

impl SqlxLegalRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn LegalRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl LegalRepository for SqlxLegalRepository {
    async fn get(&self, kind: LegalKind) -> Result<Option<LegalContent>> {
        let row = sqlx::query(
            "SELECT content_ro, content_ru, updated_at FROM legal_content WHERE kind = ?",
        )
        .bind(kind.as_str())
        .fetch_optional(self.pool.as_sqlite())
        .await
        .context("Failed to get legal content")?;

        match row {
            Some(row) => {
                let updated_at: String = row.get("updated_at");
                Ok(Some(LegalContent {
                    kind,
                    content_ro: row.get("content_ro"),
                    content_ru: row.get("content_ru"),
                    updated_at: Some(parse_timestamp(&updated_at)?),
                }))
            }
            None => Ok(None),
        }
    }

    async fn upsert(&self, content: &LegalContent) -> Result<LegalContent> {
        let updated_at = content.updated_at.unwrap_or_else(chrono::Utc::now);
        sqlx::query(
            r#"
            INSERT INTO legal_content (kind, content_ro, content_ru, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(kind) DO UPDATE SET
                content_ro = excluded.content_ro,
                content_ru = excluded.content_ru,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(content.kind.as_str())
        .bind(&content.content_ro)
        .bind(&content.content_ru)
        .bind(format_timestamp(&updated_at))
        .execute(self.pool.as_sqlite())
        .await
        .context("Failed to save legal content")?;

        Ok(LegalContent {
            updated_at: Some(updated_at),
            ..content.clone()
        })
    }
}

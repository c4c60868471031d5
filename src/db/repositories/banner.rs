//! Banner repository

use super::{format_timestamp, parse_timestamp};
use crate::db::DynDatabasePool;
use crate::models::Banner;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

#[async_trait]
pub trait BannerRepository: Send + Sync {
    async fn create(&self, banner: &Banner) -> Result<Banner>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Banner>>;

    /// Ordered by display order
    async fn list(&self, active_only: bool) -> Result<Vec<Banner>>;

    async fn update(&self, banner: &Banner) -> Result<Banner>;

    async fn delete(&self, id: &str) -> Result<bool>;
}

pub struct SqlxBannerRepository {
    pool: DynDatabasePool,
}

impl SqlxBannerRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BannerRepository> {
        Arc::new(Self::new(pool))
    }
}

const BANNER_COLUMNS: &str = "id, title, subtitle, badge, image, sort_order, active, created_at";

#[async_trait]
impl BannerRepository for SqlxBannerRepository {
    async fn create(&self, banner: &Banner) -> Result<Banner> {
        sqlx::query(
            r#"
            INSERT INTO banners (id, title, subtitle, badge, image, sort_order, active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&banner.id)
        .bind(&banner.title)
        .bind(&banner.subtitle)
        .bind(&banner.badge)
        .bind(&banner.image)
        .bind(banner.sort_order)
        .bind(banner.active)
        .bind(format_timestamp(&banner.created_at))
        .execute(self.pool.as_sqlite())
        .await
        .context("Failed to create banner")?;

        Ok(banner.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Banner>> {
        let sql = format!("SELECT {} FROM banners WHERE id = ?", BANNER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_sqlite())
            .await
            .context("Failed to get banner")?;
        row.as_ref().map(row_to_banner).transpose()
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Banner>> {
        let filter = if active_only { "WHERE active = 1" } else { "" };
        let sql = format!(
            "SELECT {} FROM banners {} ORDER BY sort_order, created_at",
            BANNER_COLUMNS, filter
        );
        let rows = sqlx::query(&sql)
            .fetch_all(self.pool.as_sqlite())
            .await
            .context("Failed to list banners")?;
        rows.iter().map(row_to_banner).collect()
    }

    async fn update(&self, banner: &Banner) -> Result<Banner> {
        sqlx::query(
            r#"
            UPDATE banners
            SET title = ?, subtitle = ?, badge = ?, image = ?, sort_order = ?, active = ?
            WHERE id = ?
            "#,
        )
        .bind(&banner.title)
        .bind(&banner.subtitle)
        .bind(&banner.badge)
        .bind(&banner.image)
        .bind(banner.sort_order)
        .bind(banner.active)
        .bind(&banner.id)
        .execute(self.pool.as_sqlite())
        .await
        .context("Failed to update banner")?;

        Ok(banner.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM banners WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_sqlite())
            .await
            .context("Failed to delete banner")?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_banner(row: &sqlx::sqlite::SqliteRow) -> Result<Banner> {
    let created_at: String = row.get("created_at");
    Ok(Banner {
        id: row.get("id"),
        title: row.get("title"),
        subtitle: row.get("subtitle"),
        badge: row.get("badge"),
        image: row.get("image"),
        sort_order: row.get("sort_order"),
        active: row.get("active"),
        created_at: parse_timestamp(&created_at)?,
    })
}

//! Partner request repository

use super::{format_timestamp, parse_enum, parse_timestamp};
use crate::db::DynDatabasePool;
use crate::models::{PartnerRequest, PartnerRequestStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

#[async_trait]
pub trait PartnerRequestRepository: Send + Sync {
    async fn create(&self, request: &PartnerRequest) -> Result<PartnerRequest>;

    /// Newest first, optionally limited to one status
    async fn list(&self, status: Option<PartnerRequestStatus>) -> Result<Vec<PartnerRequest>>;

    /// Returns false if the request does not exist
    async fn update_status(&self, id: &str, status: PartnerRequestStatus) -> Result<bool>;

    async fn count_by_status(&self, status: PartnerRequestStatus) -> Result<i64>;
}

pub struct SqlxPartnerRequestRepository {
    pool: DynDatabasePool,
}

impl SqlxPartnerRequestRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PartnerRequestRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PartnerRequestRepository for SqlxPartnerRequestRepository {
    async fn create(&self, request: &PartnerRequest) -> Result<PartnerRequest> {
        sqlx::query(
            r#"
            INSERT INTO partner_requests (id, name, email, phone, company, message, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.company)
        .bind(&request.message)
        .bind(request.status.as_str())
        .bind(format_timestamp(&request.created_at))
        .execute(self.pool.as_sqlite())
        .await
        .context("Failed to create partner request")?;

        Ok(request.clone())
    }

    async fn list(&self, status: Option<PartnerRequestStatus>) -> Result<Vec<PartnerRequest>> {
        let columns = "id, name, email, phone, company, message, status, created_at";
        let rows = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {} FROM partner_requests WHERE status = ? ORDER BY created_at DESC",
                    columns
                );
                sqlx::query(&sql)
                    .bind(status.as_str())
                    .fetch_all(self.pool.as_sqlite())
                    .await
            }
            None => {
                let sql = format!("SELECT {} FROM partner_requests ORDER BY created_at DESC", columns);
                sqlx::query(&sql).fetch_all(self.pool.as_sqlite()).await
            }
        }
        .context("Failed to list partner requests")?;

        rows.iter().map(row_to_partner_request).collect()
    }

    async fn update_status(&self, id: &str, status: PartnerRequestStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE partner_requests SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(self.pool.as_sqlite())
            .await
            .context("Failed to update partner request status")?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_status(&self, status: PartnerRequestStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM partner_requests WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(self.pool.as_sqlite())
            .await
            .context("Failed to count partner requests")?;
        Ok(count)
    }
}

fn row_to_partner_request(row: &sqlx::sqlite::SqliteRow) -> Result<PartnerRequest> {
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");

    Ok(PartnerRequest {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        company: row.get("company"),
        message: row.get("message"),
        status: parse_enum(&status)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

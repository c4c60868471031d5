//! Contact details repository (single row with id 1)

use super::{format_timestamp, parse_timestamp};
use crate::db::DynDatabasePool;
use crate::models::ContactInfo;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn get(&self) -> Result<Option<ContactInfo>>;

    async fn save(&self, contacts: &ContactInfo) -> Result<ContactInfo>;
}

pub struct SqlxContactRepository {
    pool: DynDatabasePool,
}

impl SqlxContactRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ContactRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ContactRepository for SqlxContactRepository {
    async fn get(&self) -> Result<Option<ContactInfo>> {
        let row = sqlx::query(
            r#"
            SELECT phone, email, address, map_embed_url, whatsapp_link, viber_link, telegram_link, updated_at
            FROM contacts WHERE id = 1
            "#,
        )
        .fetch_optional(self.pool.as_sqlite())
        .await
        .context("Failed to get contacts")?;

        let Some(row) = row else {
            return Ok(None);
        };
        let updated_at: Option<String> = row.get("updated_at");
        Ok(Some(ContactInfo {
            phone: row.get("phone"),
            email: row.get("email"),
            address: row.get("address"),
            map_embed_url: row.get("map_embed_url"),
            whatsapp_link: row.get("whatsapp_link"),
            viber_link: row.get("viber_link"),
            telegram_link: row.get("telegram_link"),
            updated_at: updated_at.as_deref().map(parse_timestamp).transpose()?,
        }))
    }

    async fn save(&self, contacts: &ContactInfo) -> Result<ContactInfo> {
        let updated_at = chrono::Utc::now();
        sqlx::query(
            r#"
            INSERT INTO contacts (id, phone, email, address, map_embed_url, whatsapp_link, viber_link, telegram_link, updated_at)
            VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                phone = excluded.phone,
                email = excluded.email,
                address = excluded.address,
                map_embed_url = excluded.map_embed_url,
                whatsapp_link = excluded.whatsapp_link,
                viber_link = excluded.viber_link,
                telegram_link = excluded.telegram_link,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&contacts.phone)
        .bind(&contacts.email)
        .bind(&contacts.address)
        .bind(&contacts.map_embed_url)
        .bind(&contacts.whatsapp_link)
        .bind(&contacts.viber_link)
        .bind(&contacts.telegram_link)
        .bind(format_timestamp(&updated_at))
        .execute(self.pool.as_sqlite())
        .await
        .context("Failed to save contacts")?;

        Ok(ContactInfo {
            updated_at: Some(updated_at),
            ..contacts.clone()
        })
    }
}

//! FAQ repository

use super::{format_timestamp, parse_timestamp};
use crate::db::DynDatabasePool;
use crate::models::Faq;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

#[async_trait]
pub trait FaqRepository: Send + Sync {
    async fn create(&self, faq: &Faq) -> Result<Faq>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Faq>>;

    /// Ordered by display order
    async fn list(&self, active_only: bool) -> Result<Vec<Faq>>;

    async fn update(&self, faq: &Faq) -> Result<Faq>;

    async fn delete(&self, id: &str) -> Result<bool>;
}

pub struct SqlxFaqRepository {
    pool: DynDatabasePool,
}

impl SqlxFaqRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn FaqRepository> {
        Arc::new(Self::new(pool))
    }
}

const FAQ_COLUMNS: &str =
    "id, question_ro, answer_ro, question_ru, answer_ru, sort_order, active, created_at";

#[async_trait]
impl FaqRepository for SqlxFaqRepository {
    async fn create(&self, faq: &Faq) -> Result<Faq> {
        sqlx::query(
            r#"
            INSERT INTO faqs (id, question_ro, answer_ro, question_ru, answer_ru, sort_order, active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&faq.id)
        .bind(&faq.question_ro)
        .bind(&faq.answer_ro)
        .bind(&faq.question_ru)
        .bind(&faq.answer_ru)
        .bind(faq.sort_order)
        .bind(faq.active)
        .bind(format_timestamp(&faq.created_at))
        .execute(self.pool.as_sqlite())
        .await
        .context("Failed to create FAQ")?;

        Ok(faq.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Faq>> {
        let sql = format!("SELECT {} FROM faqs WHERE id = ?", FAQ_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_sqlite())
            .await
            .context("Failed to get FAQ")?;
        row.as_ref().map(row_to_faq).transpose()
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Faq>> {
        let filter = if active_only { "WHERE active = 1" } else { "" };
        let sql = format!("SELECT {} FROM faqs {} ORDER BY sort_order, created_at", FAQ_COLUMNS, filter);
        let rows = sqlx::query(&sql)
            .fetch_all(self.pool.as_sqlite())
            .await
            .context("Failed to list FAQs")?;
        rows.iter().map(row_to_faq).collect()
    }

    async fn update(&self, faq: &Faq) -> Result<Faq> {
        sqlx::query(
            r#"
            UPDATE faqs
            SET question_ro = ?, answer_ro = ?, question_ru = ?, answer_ru = ?, sort_order = ?, active = ?
            WHERE id = ?
            "#,
        )
        .bind(&faq.question_ro)
        .bind(&faq.answer_ro)
        .bind(&faq.question_ru)
        .bind(&faq.answer_ru)
        .bind(faq.sort_order)
        .bind(faq.active)
        .bind(&faq.id)
        .execute(self.pool.as_sqlite())
        .await
        .context("Failed to update FAQ")?;

        Ok(faq.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_sqlite())
            .await
            .context("Failed to delete FAQ")?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_faq(row: &sqlx::sqlite::SqliteRow) -> Result<Faq> {
    let created_at: String = row.get("created_at");
    Ok(Faq {
        id: row.get("id"),
        question_ro: row.get("question_ro"),
        answer_ro: row.get("answer_ro"),
        question_ru: row.get("question_ru"),
        answer_ru: row.get("answer_ru"),
        sort_order: row.get("sort_order"),
        active: row.get("active"),
        created_at: parse_timestamp(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use crate::models::FaqInput;

    async fn setup_test_repo() -> SqlxFaqRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        SqlxFaqRepository::new(pool)
    }

    fn test_faq(order: i32, active: bool) -> Faq {
        FaqInput {
            question_ro: format!("Întrebare {}", order),
            answer_ro: "Răspuns".to_string(),
            question_ru: format!("Вопрос {}", order),
            answer_ru: "Ответ".to_string(),
            order,
            active,
        }
        .into_faq()
    }

    #[tokio::test]
    async fn test_list_orders_and_filters() {
        let repo = setup_test_repo().await;
        repo.create(&test_faq(2, true)).await.unwrap();
        repo.create(&test_faq(1, true)).await.unwrap();
        repo.create(&test_faq(0, false)).await.unwrap();

        let active = repo.list(true).await.unwrap();
        assert_eq!(active.iter().map(|f| f.sort_order).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(repo.list(false).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = setup_test_repo().await;
        let mut faq = test_faq(0, true);
        repo.create(&faq).await.unwrap();

        faq.answer_ru = "Новый ответ".to_string();
        faq.active = false;
        repo.update(&faq).await.unwrap();
        let found = repo.get_by_id(&faq.id).await.unwrap().unwrap();
        assert_eq!(found.answer_ru, "Новый ответ");
        assert!(!found.active);

        assert!(repo.delete(&faq.id).await.unwrap());
        assert!(repo.get_by_id(&faq.id).await.unwrap().is_none());
    }
}

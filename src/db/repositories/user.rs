//! User repository
//!
//! Users and their favorite cars. Favorites live in `user_favorites` and are
//! loaded into `User::favorites` on every read.

use super::{format_timestamp, parse_enum, parse_timestamp};
use crate::db::DynDatabasePool;
use crate::models::{Language, User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// One user column written by [`UserRepository::update_field`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserField {
    Name(String),
    Language(Language),
    Picture(String),
    Role(UserRole),
}

impl UserField {
    fn column_and_value(&self) -> (&'static str, &str) {
        match self {
            UserField::Name(name) => ("name", name.as_str()),
            UserField::Language(language) => ("language", language.as_str()),
            UserField::Picture(picture) => ("picture", picture.as_str()),
            UserField::Role(role) => ("role", role.as_str()),
        }
    }
}

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User>;

    async fn get_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn get_by_phone(&self, phone: &str) -> Result<Option<User>>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// All users, newest first
    async fn list(&self) -> Result<Vec<User>>;

    /// Write a single column and return the stored user, or None if absent.
    /// Other columns are left as they are in the database.
    async fn update_field(&self, id: &str, field: UserField) -> Result<Option<User>>;

    /// Delete a user and their favorites. Returns false if absent.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Count users without the admin role
    async fn count_non_admin(&self) -> Result<i64>;

    /// Add a favorite car. Adding twice is a no-op.
    async fn add_favorite(&self, user_id: &str, car_id: &str) -> Result<()>;

    async fn remove_favorite(&self, user_id: &str, car_id: &str) -> Result<()>;

    async fn list_favorites(&self, user_id: &str) -> Result<Vec<String>>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        create_user(self.pool.as_sqlite(), user).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        get_user_where(self.pool.as_sqlite(), "id", id).await
    }

    async fn get_by_phone(&self, phone: &str) -> Result<Option<User>> {
        get_user_where(self.pool.as_sqlite(), "phone", phone).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        get_user_where(self.pool.as_sqlite(), "email", email).await
    }

    async fn list(&self) -> Result<Vec<User>> {
        list_users(self.pool.as_sqlite()).await
    }

    async fn update_field(&self, id: &str, field: UserField) -> Result<Option<User>> {
        let pool = self.pool.as_sqlite();
        if !update_user_field(pool, id, &field).await? {
            return Ok(None);
        }
        get_user_where(pool, "id", id).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        delete_user(self.pool.as_sqlite(), id).await
    }

    async fn count_non_admin(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role != ?")
            .bind(UserRole::Admin.as_str())
            .fetch_one(self.pool.as_sqlite())
            .await
            .context("Failed to count users")?;
        Ok(count)
    }

    async fn add_favorite(&self, user_id: &str, car_id: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO user_favorites (user_id, car_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(car_id)
        .bind(format_timestamp(&Utc::now()))
        .execute(self.pool.as_sqlite())
        .await
        .context("Failed to add favorite")?;
        Ok(())
    }

    async fn remove_favorite(&self, user_id: &str, car_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM user_favorites WHERE user_id = ? AND car_id = ?")
            .bind(user_id)
            .bind(car_id)
            .execute(self.pool.as_sqlite())
            .await
            .context("Failed to remove favorite")?;
        Ok(())
    }

    async fn list_favorites(&self, user_id: &str) -> Result<Vec<String>> {
        load_favorites(self.pool.as_sqlite(), user_id).await
    }
}

const USER_COLUMNS: &str =
    "id, phone, email, name, password_hash, picture, role, language, auth_type, created_at";

async fn create_user(pool: &SqlitePool, user: &User) -> Result<User> {
    sqlx::query(
        r#"
        INSERT INTO users (id, phone, email, name, password_hash, picture, role, language, auth_type, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.phone)
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.password_hash)
    .bind(&user.picture)
    .bind(user.role.as_str())
    .bind(user.language.as_str())
    .bind(user.auth_type.as_str())
    .bind(format_timestamp(&user.created_at))
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(User {
        favorites: Vec::new(),
        ..user.clone()
    })
}

async fn get_user_where(pool: &SqlitePool, column: &'static str, value: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, column);
    let row = sqlx::query(&sql)
        .bind(value)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to get user by {}", column))?;

    match row {
        Some(row) => {
            let mut user = row_to_user(&row)?;
            user.favorites = load_favorites(pool, &user.id).await?;
            Ok(Some(user))
        }
        None => Ok(None),
    }
}

async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let sql = format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLUMNS);
    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .context("Failed to list users")?;

    let mut users = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut user = row_to_user(row)?;
        user.favorites = load_favorites(pool, &user.id).await?;
        users.push(user);
    }
    Ok(users)
}

async fn update_user_field(pool: &SqlitePool, id: &str, field: &UserField) -> Result<bool> {
    let (column, value) = field.column_and_value();
    let sql = format!("UPDATE users SET {} = ? WHERE id = ?", column);
    let result = sqlx::query(&sql)
        .bind(value)
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to update user {}", column))?;
    Ok(result.rows_affected() > 0)
}

async fn delete_user(pool: &SqlitePool, id: &str) -> Result<bool> {
    sqlx::query("DELETE FROM user_favorites WHERE user_id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user favorites")?;

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;

    Ok(result.rows_affected() > 0)
}

async fn load_favorites(pool: &SqlitePool, user_id: &str) -> Result<Vec<String>> {
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT car_id FROM user_favorites WHERE user_id = ? ORDER BY created_at, car_id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to load favorites")?;
    Ok(ids)
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role: String = row.get("role");
    let language: String = row.get("language");
    let auth_type: String = row.get("auth_type");
    let created_at: String = row.get("created_at");

    Ok(User {
        id: row.get("id"),
        phone: row.get("phone"),
        email: row.get("email"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        picture: row.get("picture"),
        role: parse_enum(&role)?,
        language: parse_enum(&language)?,
        auth_type: parse_enum(&auth_type)?,
        favorites: Vec::new(),
        created_at: parse_timestamp(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxUserRepository::new(pool)
    }

    fn test_user(phone: &str) -> User {
        User::new_phone_user(phone.to_string(), None, "Test User".to_string(), "hash".to_string())
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = setup_test_repo().await;
        let mut user = test_user("+37360000001");
        user.email = Some("ion@example.md".to_string());
        repo.create(&user).await.unwrap();

        let by_id = repo.get_by_id(&user.id).await.unwrap().expect("by id");
        assert_eq!(by_id.name, "Test User");
        assert_eq!(by_id.password_hash.as_deref(), Some("hash"));

        let by_phone = repo.get_by_phone("+37360000001").await.unwrap().expect("by phone");
        assert_eq!(by_phone.id, user.id);

        let by_email = repo.get_by_email("ion@example.md").await.unwrap().expect("by email");
        assert_eq!(by_email.id, user.id);

        assert!(repo.get_by_phone("+000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_phone_fails() {
        let repo = setup_test_repo().await;
        repo.create(&test_user("+37360000001")).await.unwrap();
        assert!(repo.create(&test_user("+37360000001")).await.is_err());
    }

    #[tokio::test]
    async fn test_update_field_touches_one_column() {
        let repo = setup_test_repo().await;
        let user = test_user("+37360000002");
        repo.create(&user).await.unwrap();

        let promoted = repo
            .update_field(&user.id, UserField::Role(UserRole::Admin))
            .await
            .unwrap()
            .unwrap();
        assert!(promoted.is_admin());

        // A later profile write must not carry the old role back
        repo.update_field(&user.id, UserField::Name("Renamed".to_string())).await.unwrap();
        let found = repo
            .update_field(&user.id, UserField::Language(Language::Ru))
            .await
            .unwrap()
            .unwrap();
        assert!(found.is_admin());
        assert_eq!(found.language, Language::Ru);
        assert_eq!(found.name, "Renamed");
        assert_eq!(found.phone.as_deref(), Some("+37360000002"));
    }

    #[tokio::test]
    async fn test_update_field_on_missing_user() {
        let repo = setup_test_repo().await;
        let result = repo
            .update_field("user_missing", UserField::Picture("p.png".to_string()))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_favorites_are_a_set() {
        let repo = setup_test_repo().await;
        let user = test_user("+37360000003");
        repo.create(&user).await.unwrap();

        repo.add_favorite(&user.id, "car_a").await.unwrap();
        repo.add_favorite(&user.id, "car_a").await.unwrap();
        repo.add_favorite(&user.id, "car_b").await.unwrap();
        assert_eq!(repo.list_favorites(&user.id).await.unwrap().len(), 2);

        repo.remove_favorite(&user.id, "car_a").await.unwrap();
        repo.remove_favorite(&user.id, "car_a").await.unwrap();
        let found = repo.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(found.favorites, vec!["car_b".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_and_count() {
        let repo = setup_test_repo().await;
        let user = test_user("+37360000004");
        let mut admin = test_user("+37360000005");
        admin.role = UserRole::Admin;
        repo.create(&user).await.unwrap();
        repo.create(&admin).await.unwrap();
        repo.add_favorite(&user.id, "car_a").await.unwrap();

        assert_eq!(repo.count_non_admin().await.unwrap(), 1);
        assert_eq!(repo.list().await.unwrap().len(), 2);

        assert!(repo.delete(&user.id).await.unwrap());
        assert!(!repo.delete(&user.id).await.unwrap());
        assert!(repo.get_by_id(&user.id).await.unwrap().is_none());
        assert_eq!(repo.count_non_admin().await.unwrap(), 0);
    }
}

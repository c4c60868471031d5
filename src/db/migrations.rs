//! Database migrations
//!
//! Migrations are embedded as SQL strings and applied in version order. Each
//! applied version is recorded in `_migrations`, so running them again is a
//! no-op.
//!
//! Conventions shared by every table:
//! - identifiers are prefixed strings (`user_…`, `car_…`, `booking_…`)
//! - money is stored as decimal TEXT
//! - timestamps are RFC3339 TEXT

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use super::DynDatabasePool;

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Unique, increasing version number
    pub version: i32,
    pub name: &'static str,
    pub up: &'static str,
}

/// Migration record stored in the database
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                phone TEXT UNIQUE,
                email TEXT UNIQUE,
                name TEXT NOT NULL,
                password_hash TEXT,
                picture TEXT,
                role TEXT NOT NULL DEFAULT 'user',
                language TEXT NOT NULL DEFAULT 'ro',
                auth_type TEXT NOT NULL DEFAULT 'phone',
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);
        "#,
    },
    Migration {
        version: 2,
        name: "create_sessions",
        up: r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                token TEXT NOT NULL,
                user_id TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_token ON sessions(token);
            CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
        "#,
    },
    Migration {
        version: 3,
        name: "create_cars",
        up: r#"
            CREATE TABLE IF NOT EXISTS cars (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                brand TEXT NOT NULL,
                model TEXT NOT NULL,
                year INTEGER NOT NULL,
                body_type TEXT NOT NULL DEFAULT 'sedan',
                transmission TEXT NOT NULL,
                fuel TEXT NOT NULL,
                seats INTEGER NOT NULL,
                images TEXT NOT NULL DEFAULT '[]',
                main_image_index INTEGER NOT NULL DEFAULT 0,
                price_day_1 TEXT NOT NULL,
                price_day_3 TEXT NOT NULL,
                price_day_5 TEXT NOT NULL,
                price_day_10 TEXT NOT NULL,
                price_day_20 TEXT NOT NULL,
                casco_price TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                specs TEXT NOT NULL DEFAULT '{}',
                sort_order INTEGER NOT NULL DEFAULT 0,
                available INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_cars_available ON cars(available);
        "#,
    },
    Migration {
        version: 4,
        name: "create_user_favorites",
        up: r#"
            CREATE TABLE IF NOT EXISTS user_favorites (
                user_id TEXT NOT NULL,
                car_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (user_id, car_id),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
        "#,
    },
    Migration {
        version: 5,
        name: "create_bookings",
        up: r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                car_id TEXT NOT NULL,
                car_name TEXT NOT NULL,
                car_image TEXT NOT NULL DEFAULT '',
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                location TEXT NOT NULL,
                insurance TEXT NOT NULL,
                customer_name TEXT NOT NULL,
                customer_phone TEXT NOT NULL,
                customer_age INTEGER NOT NULL,
                total_price TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_bookings_user_id ON bookings(user_id);
            CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status);
            CREATE INDEX IF NOT EXISTS idx_bookings_created_at ON bookings(created_at);
        "#,
    },
    Migration {
        version: 6,
        name: "create_partner_requests",
        up: r#"
            CREATE TABLE IF NOT EXISTS partner_requests (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                company TEXT,
                message TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_partner_requests_status ON partner_requests(status);
        "#,
    },
    Migration {
        version: 7,
        name: "create_content",
        up: r#"
            CREATE TABLE IF NOT EXISTS faqs (
                id TEXT PRIMARY KEY,
                question_ro TEXT NOT NULL,
                answer_ro TEXT NOT NULL,
                question_ru TEXT NOT NULL,
                answer_ru TEXT NOT NULL,
                sort_order INTEGER NOT NULL DEFAULT 0,
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS banners (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                subtitle TEXT NOT NULL DEFAULT '',
                badge TEXT NOT NULL DEFAULT '',
                image TEXT NOT NULL,
                sort_order INTEGER NOT NULL DEFAULT 0,
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS legal_content (
                kind TEXT PRIMARY KEY,
                content_ro TEXT NOT NULL,
                content_ru TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS contacts (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                phone TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL DEFAULT '',
                address TEXT NOT NULL DEFAULT '',
                map_embed_url TEXT NOT NULL DEFAULT '',
                whatsapp_link TEXT NOT NULL DEFAULT '',
                viber_link TEXT NOT NULL DEFAULT '',
                telegram_link TEXT NOT NULL DEFAULT '',
                updated_at TEXT
            );
        "#,
    },
];

/// Run all pending migrations, returning how many were applied
pub async fn run_migrations(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = get_applied_migrations(pool.as_sqlite()).await?;
    let applied_versions: Vec<i32> = applied.iter().map(|m| m.version as i32).collect();

    let mut count = 0;

    for migration in MIGRATIONS {
        if !applied_versions.contains(&migration.version) {
            tracing::info!("Applying migration {}: {}", migration.version, migration.name);
            apply_migration(pool.as_sqlite(), migration)
                .await
                .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

async fn create_migrations_table(pool: &DynDatabasePool) -> Result<()> {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;
    Ok(())
}

async fn get_applied_migrations(pool: &SqlitePool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;

    Ok(rows
        .iter()
        .map(|row| MigrationRecord {
            version: row.get("version"),
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        })
        .collect())
}

async fn apply_migration(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin migration")?;

    for statement in split_sql_statements(migration.up) {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(&mut *tx)
        .await?;

    tx.commit().await.context("Failed to commit migration")?;
    Ok(())
}

fn truncate_sql(sql: &str) -> String {
    if sql.len() > 100 {
        let cut = sql
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= 100)
            .last()
            .unwrap_or(0);
        format!("{}...", &sql[..cut])
    } else {
        sql.to_string()
    }
}

/// Split SQL into individual statements, skipping comment-only fragments
fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty() && !is_comment_only(stmt))
        .collect()
}

fn is_comment_only(s: &str) -> bool {
    s.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}

/// Check whether every migration has been applied
pub async fn is_up_to_date(pool: &DynDatabasePool) -> Result<bool> {
    create_migrations_table(pool).await?;
    let applied = get_applied_migrations(pool.as_sqlite()).await?;
    Ok(applied.len() == MIGRATIONS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn test_run_migrations() {
        let pool = create_test_pool().await.expect("Failed to create test pool");

        let count = run_migrations(&pool).await.expect("Failed to run migrations");
        assert_eq!(count, MIGRATIONS.len());

        let count = run_migrations(&pool).await.expect("Failed to run migrations");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_is_up_to_date() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        assert!(!is_up_to_date(&pool).await.unwrap());

        run_migrations(&pool).await.expect("Failed to run migrations");
        assert!(is_up_to_date(&pool).await.unwrap());
    }

    #[tokio::test]
    async fn test_phone_is_unique_but_nullable() {
        let pool = create_test_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let db = pool.as_sqlite();

        let insert = "INSERT INTO users (id, phone, email, name, role, created_at) VALUES (?, ?, ?, ?, 'user', '2024-01-01T00:00:00Z')";
        sqlx::query(insert).bind("user_a").bind("+373600").bind(Option::<String>::None).bind("A").execute(db).await.unwrap();
        sqlx::query(insert).bind("user_b").bind(Option::<String>::None).bind(Option::<String>::None).bind("B").execute(db).await.unwrap();
        sqlx::query(insert).bind("user_c").bind(Option::<String>::None).bind(Option::<String>::None).bind("C").execute(db).await.unwrap();

        let duplicate = sqlx::query(insert).bind("user_d").bind("+373600").bind(Option::<String>::None).bind("D").execute(db).await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_contacts_is_singleton() {
        let pool = create_test_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();

        let second = pool.execute("INSERT INTO contacts (id) VALUES (2)").await;
        assert!(second.is_err());
    }

    #[test]
    fn test_split_sql_statements() {
        let sql = "CREATE TABLE a (id INTEGER);\n  -- comment only\n;\nCREATE INDEX i ON a(id);";
        let statements = split_sql_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE"));
        assert!(statements[1].starts_with("CREATE INDEX"));
    }

    #[test]
    fn test_versions_are_unique_and_increasing() {
        for pair in MIGRATIONS.windows(2) {
            assert!(pair[0].version < pair[1].version);
        }
    }
}

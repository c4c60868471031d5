//! Car repository
//!
//! Rates are stored as decimal text, `images` and `specs` as JSON text.

use super::{format_timestamp, parse_decimal, parse_enum, parse_timestamp};
use crate::db::DynDatabasePool;
use crate::models::{Car, CarFilter, Tariff};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

/// Car repository trait
#[async_trait]
pub trait CarRepository: Send + Sync {
    async fn create(&self, car: &Car) -> Result<Car>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Car>>;

    /// Cars matching the filter, ordered by display order then name
    async fn list(&self, filter: &CarFilter) -> Result<Vec<Car>>;

    /// Cars with the given ids, in catalog order. Unknown ids are skipped.
    async fn get_many(&self, ids: &[String]) -> Result<Vec<Car>>;

    async fn update(&self, car: &Car) -> Result<Car>;

    /// Returns false if the car did not exist
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn count(&self) -> Result<i64>;
}

/// SQLx-based car repository implementation
pub struct SqlxCarRepository {
    pool: DynDatabasePool,
}

impl SqlxCarRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CarRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CarRepository for SqlxCarRepository {
    async fn create(&self, car: &Car) -> Result<Car> {
        create_car(self.pool.as_sqlite(), car).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Car>> {
        let sql = format!("SELECT {} FROM cars WHERE id = ?", CAR_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_sqlite())
            .await
            .context("Failed to get car by ID")?;

        row.as_ref().map(row_to_car).transpose()
    }

    async fn list(&self, filter: &CarFilter) -> Result<Vec<Car>> {
        list_cars(self.pool.as_sqlite(), filter).await
    }

    async fn get_many(&self, ids: &[String]) -> Result<Vec<Car>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM cars WHERE id IN (", CAR_COLUMNS));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ORDER BY sort_order, name");

        let rows = builder
            .build()
            .fetch_all(self.pool.as_sqlite())
            .await
            .context("Failed to get cars by IDs")?;
        rows.iter().map(row_to_car).collect()
    }

    async fn update(&self, car: &Car) -> Result<Car> {
        update_car(self.pool.as_sqlite(), car).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cars WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_sqlite())
            .await
            .context("Failed to delete car")?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
            .fetch_one(self.pool.as_sqlite())
            .await
            .context("Failed to count cars")?;
        Ok(count)
    }
}

const CAR_COLUMNS: &str = "id, name, brand, model, year, body_type, transmission, fuel, seats, \
    images, main_image_index, price_day_1, price_day_3, price_day_5, price_day_10, price_day_20, \
    casco_price, description, specs, sort_order, available, created_at";

async fn create_car(pool: &SqlitePool, car: &Car) -> Result<Car> {
    let images = serde_json::to_string(&car.images).context("Failed to encode images")?;
    let specs = serde_json::to_string(&car.specs).context("Failed to encode specs")?;

    sqlx::query(
        r#"
        INSERT INTO cars (
            id, name, brand, model, year, body_type, transmission, fuel, seats,
            images, main_image_index, price_day_1, price_day_3, price_day_5, price_day_10, price_day_20,
            casco_price, description, specs, sort_order, available, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&car.id)
    .bind(&car.name)
    .bind(&car.brand)
    .bind(&car.model)
    .bind(car.year)
    .bind(car.body_type.as_str())
    .bind(car.transmission.as_str())
    .bind(car.fuel.as_str())
    .bind(car.seats)
    .bind(images)
    .bind(car.main_image_index)
    .bind(car.pricing.day_1.to_string())
    .bind(car.pricing.day_3.to_string())
    .bind(car.pricing.day_5.to_string())
    .bind(car.pricing.day_10.to_string())
    .bind(car.pricing.day_20.to_string())
    .bind(car.casco_price.to_string())
    .bind(&car.description)
    .bind(specs)
    .bind(car.sort_order)
    .bind(car.available)
    .bind(format_timestamp(&car.created_at))
    .execute(pool)
    .await
    .context("Failed to create car")?;

    Ok(car.clone())
}

async fn list_cars(pool: &SqlitePool, filter: &CarFilter) -> Result<Vec<Car>> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM cars WHERE 1 = 1", CAR_COLUMNS));

    if filter.available_only {
        builder.push(" AND available = 1");
    }
    if let Some(brand) = filter.brand.as_deref().filter(|b| !b.is_empty()) {
        builder
            .push(" AND LOWER(brand) LIKE ")
            .push_bind(format!("%{}%", brand.to_lowercase()));
    }
    if let Some(transmission) = filter.transmission {
        builder.push(" AND transmission = ").push_bind(transmission.as_str());
    }
    if let Some(fuel) = filter.fuel {
        builder.push(" AND fuel = ").push_bind(fuel.as_str());
    }
    if let Some(body_type) = filter.body_type {
        builder.push(" AND body_type = ").push_bind(body_type.as_str());
    }
    if let Some(min_seats) = filter.min_seats {
        builder.push(" AND seats >= ").push_bind(min_seats);
    }
    builder.push(" ORDER BY sort_order, name");

    let rows = builder
        .build()
        .fetch_all(pool)
        .await
        .context("Failed to list cars")?;
    rows.iter().map(row_to_car).collect()
}

async fn update_car(pool: &SqlitePool, car: &Car) -> Result<Car> {
    let images = serde_json::to_string(&car.images).context("Failed to encode images")?;
    let specs = serde_json::to_string(&car.specs).context("Failed to encode specs")?;

    sqlx::query(
        r#"
        UPDATE cars SET
            name = ?, brand = ?, model = ?, year = ?, body_type = ?, transmission = ?, fuel = ?,
            seats = ?, images = ?, main_image_index = ?, price_day_1 = ?, price_day_3 = ?,
            price_day_5 = ?, price_day_10 = ?, price_day_20 = ?, casco_price = ?, description = ?,
            specs = ?, sort_order = ?, available = ?
        WHERE id = ?
        "#,
    )
    .bind(&car.name)
    .bind(&car.brand)
    .bind(&car.model)
    .bind(car.year)
    .bind(car.body_type.as_str())
    .bind(car.transmission.as_str())
    .bind(car.fuel.as_str())
    .bind(car.seats)
    .bind(images)
    .bind(car.main_image_index)
    .bind(car.pricing.day_1.to_string())
    .bind(car.pricing.day_3.to_string())
    .bind(car.pricing.day_5.to_string())
    .bind(car.pricing.day_10.to_string())
    .bind(car.pricing.day_20.to_string())
    .bind(car.casco_price.to_string())
    .bind(&car.description)
    .bind(specs)
    .bind(car.sort_order)
    .bind(car.available)
    .bind(&car.id)
    .execute(pool)
    .await
    .context("Failed to update car")?;

    Ok(car.clone())
}

fn row_to_car(row: &sqlx::sqlite::SqliteRow) -> Result<Car> {
    let body_type: String = row.get("body_type");
    let transmission: String = row.get("transmission");
    let fuel: String = row.get("fuel");
    let images: String = row.get("images");
    let specs: String = row.get("specs");
    let created_at: String = row.get("created_at");
    let price = |column: &str| -> Result<rust_decimal::Decimal> {
        let value: String = row.get(column);
        parse_decimal(&value)
    };

    Ok(Car {
        id: row.get("id"),
        name: row.get("name"),
        brand: row.get("brand"),
        model: row.get("model"),
        year: row.get("year"),
        body_type: parse_enum(&body_type)?,
        transmission: parse_enum(&transmission)?,
        fuel: parse_enum(&fuel)?,
        seats: row.get("seats"),
        images: serde_json::from_str(&images).context("Invalid stored images")?,
        main_image_index: row.get("main_image_index"),
        pricing: Tariff {
            day_1: price("price_day_1")?,
            day_3: price("price_day_3")?,
            day_5: price("price_day_5")?,
            day_10: price("price_day_10")?,
            day_20: price("price_day_20")?,
        },
        casco_price: price("casco_price")?,
        description: row.get("description"),
        specs: serde_json::from_str(&specs).context("Invalid stored specs")?,
        sort_order: row.get("sort_order"),
        available: row.get("available"),
        created_at: parse_timestamp(&created_at)?,
    })
}

//! Booking repository

use super::{format_timestamp, parse_decimal, parse_enum, parse_timestamp};
use crate::db::DynDatabasePool;
use crate::models::{Booking, BookingStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;

/// Booking repository trait
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking) -> Result<Booking>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Booking>>;

    /// A user's bookings, newest first
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>>;

    /// All bookings, newest first, optionally limited to one status
    async fn list(&self, status: Option<BookingStatus>, limit: Option<i64>) -> Result<Vec<Booking>>;

    /// Returns false if the booking does not exist
    async fn update_status(&self, id: &str, status: BookingStatus) -> Result<bool>;

    async fn delete(&self, id: &str) -> Result<bool>;

    async fn count(&self) -> Result<i64>;

    /// Number of bookings per status. Statuses without bookings are absent.
    async fn count_by_status(&self) -> Result<HashMap<BookingStatus, i64>>;
}

/// SQLx-based booking repository implementation
pub struct SqlxBookingRepository {
    pool: DynDatabasePool,
}

impl SqlxBookingRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BookingRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl BookingRepository for SqlxBookingRepository {
    async fn create(&self, booking: &Booking) -> Result<Booking> {
        create_booking(self.pool.as_sqlite(), booking).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Booking>> {
        let sql = format!("SELECT {} FROM bookings WHERE id = ?", BOOKING_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_sqlite())
            .await
            .context("Failed to get booking by ID")?;
        row.as_ref().map(row_to_booking).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE user_id = ? ORDER BY created_at DESC",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(self.pool.as_sqlite())
            .await
            .context("Failed to list user bookings")?;
        rows.iter().map(row_to_booking).collect()
    }

    async fn list(&self, status: Option<BookingStatus>, limit: Option<i64>) -> Result<Vec<Booking>> {
        list_bookings(self.pool.as_sqlite(), status, limit).await
    }

    async fn update_status(&self, id: &str, status: BookingStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(self.pool.as_sqlite())
            .await
            .context("Failed to update booking status")?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_sqlite())
            .await
            .context("Failed to delete booking")?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(self.pool.as_sqlite())
            .await
            .context("Failed to count bookings")?;
        Ok(count)
    }

    async fn count_by_status(&self) -> Result<HashMap<BookingStatus, i64>> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS total FROM bookings GROUP BY status")
            .fetch_all(self.pool.as_sqlite())
            .await
            .context("Failed to count bookings by status")?;

        let mut counts = HashMap::new();
        for row in rows {
            let status: String = row.get("status");
            counts.insert(parse_enum(&status)?, row.get("total"));
        }
        Ok(counts)
    }
}

const BOOKING_COLUMNS: &str = "id, user_id, car_id, car_name, car_image, start_date, end_date, \
    start_time, end_time, location, insurance, customer_name, customer_phone, customer_age, \
    total_price, status, created_at";

async fn create_booking(pool: &SqlitePool, booking: &Booking) -> Result<Booking> {
    sqlx::query(
        r#"
        INSERT INTO bookings (
            id, user_id, car_id, car_name, car_image, start_date, end_date, start_time, end_time,
            location, insurance, customer_name, customer_phone, customer_age, total_price, status, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&booking.id)
    .bind(&booking.user_id)
    .bind(&booking.car_id)
    .bind(&booking.car_name)
    .bind(&booking.car_image)
    .bind(&booking.start_date)
    .bind(&booking.end_date)
    .bind(&booking.start_time)
    .bind(&booking.end_time)
    .bind(booking.location.as_str())
    .bind(booking.insurance.as_str())
    .bind(&booking.customer_name)
    .bind(&booking.customer_phone)
    .bind(booking.customer_age)
    .bind(booking.total_price.to_string())
    .bind(booking.status.as_str())
    .bind(format_timestamp(&booking.created_at))
    .execute(pool)
    .await
    .context("Failed to create booking")?;

    Ok(booking.clone())
}

async fn list_bookings(
    pool: &SqlitePool,
    status: Option<BookingStatus>,
    limit: Option<i64>,
) -> Result<Vec<Booking>> {
    let filter = if status.is_some() { "WHERE status = ?" } else { "" };
    let sql = format!(
        "SELECT {} FROM bookings {} ORDER BY created_at DESC LIMIT ?",
        BOOKING_COLUMNS, filter
    );

    let mut query = sqlx::query(&sql);
    if let Some(status) = status {
        query = query.bind(status.as_str());
    }
    // SQLite treats a negative LIMIT as unbounded
    let rows = query
        .bind(limit.unwrap_or(-1))
        .fetch_all(pool)
        .await
        .context("Failed to list bookings")?;
    rows.iter().map(row_to_booking).collect()
}

fn row_to_booking(row: &sqlx::sqlite::SqliteRow) -> Result<Booking> {
    let location: String = row.get("location");
    let insurance: String = row.get("insurance");
    let total_price: String = row.get("total_price");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");

    Ok(Booking {
        id: row.get("id"),
        user_id: row.get("user_id"),
        car_id: row.get("car_id"),
        car_name: row.get("car_name"),
        car_image: row.get("car_image"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        location: parse_enum(&location)?,
        insurance: parse_enum(&insurance)?,
        customer_name: row.get("customer_name"),
        customer_phone: row.get("customer_phone"),
        customer_age: row.get("customer_age"),
        total_price: parse_decimal(&total_price)?,
        status: parse_enum(&status)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

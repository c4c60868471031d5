//! Booking service
//!
//! `create_booking` validates everything before the single insert:
//! car lookup, then pricing, then the image snapshot.

use crate::db::repositories::{BookingRepository, CarRepository};
use crate::models::{new_id, Booking, BookingStatus, CreateBookingInput, User};
use crate::services::pricing::{PricingError, QuoteRequest};
use anyhow::Context;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

/// Error types for booking service operations
#[derive(Debug, thiserror::Error)]
pub enum BookingServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid date range")]
    InvalidRange,

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<PricingError> for BookingServiceError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::InvalidRange => Self::InvalidRange,
            PricingError::Invalid(message) => Self::ValidationError(message),
        }
    }
}

pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    cars: Arc<dyn CarRepository>,
}

impl BookingService {
    pub fn new(bookings: Arc<dyn BookingRepository>, cars: Arc<dyn CarRepository>) -> Self {
        Self { bookings, cars }
    }

    /// Price and persist a reservation for `user` with status pending
    pub async fn create_booking(
        &self,
        user: &User,
        input: CreateBookingInput,
    ) -> Result<Booking, BookingServiceError> {
        let car = self
            .cars
            .get_by_id(&input.car_id)
            .await
            .context("Failed to get car")?
            .ok_or_else(|| BookingServiceError::NotFound("Car not found".to_string()))?;

        let request = QuoteRequest {
            car_id: input.car_id.clone(),
            start_date: input.start_date.clone(),
            end_date: input.end_date.clone(),
            start_time: input.start_time.clone(),
            end_time: input.end_time.clone(),
            location: input.location.clone(),
            insurance: input.insurance.clone(),
        };
        let terms = request.terms()?;
        let quote = terms.quote(&car)?;

        let booking = Booking {
            id: new_id("booking"),
            user_id: user.id.clone(),
            car_id: car.id.clone(),
            car_name: car.name.clone(),
            car_image: car.display_image(),
            start_date: input.start_date,
            end_date: input.end_date,
            start_time: input.start_time,
            end_time: input.end_time,
            location: terms.location,
            insurance: terms.insurance,
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            customer_age: input.customer_age,
            total_price: quote.total_price,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        };

        let booking = self
            .bookings
            .create(&booking)
            .await
            .context("Failed to create booking")?;
        tracing::info!("Created booking {} for car {}", booking.id, booking.car_id);
        Ok(booking)
    }

    /// The user's own bookings, newest first
    pub async fn list_for_user(&self, user: &User) -> Result<Vec<Booking>, BookingServiceError> {
        Ok(self
            .bookings
            .list_by_user(&user.id)
            .await
            .context("Failed to list user bookings")?)
    }

    /// All bookings, newest first. Bookings without an image snapshot show
    /// the car's current display image; nothing is written back.
    pub async fn list_all(&self, status: Option<&str>) -> Result<Vec<Booking>, BookingServiceError> {
        let status = status.map(parse_status).transpose()?;
        let mut bookings = self
            .bookings
            .list(status, None)
            .await
            .context("Failed to list bookings")?;
        self.fill_missing_images(&mut bookings).await?;
        Ok(bookings)
    }

    /// The newest `limit` bookings
    pub async fn recent(&self, limit: i64) -> Result<Vec<Booking>, BookingServiceError> {
        Ok(self
            .bookings
            .list(None, Some(limit))
            .await
            .context("Failed to list recent bookings")?)
    }

    async fn fill_missing_images(&self, bookings: &mut [Booking]) -> Result<(), BookingServiceError> {
        let missing: Vec<String> = bookings
            .iter()
            .filter(|b| b.car_image.is_empty())
            .map(|b| b.car_id.clone())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        let images: HashMap<String, String> = self
            .cars
            .get_many(&missing)
            .await
            .context("Failed to load booking cars")?
            .into_iter()
            .map(|car| {
                let image = car.display_image();
                (car.id, image)
            })
            .collect();

        for booking in bookings.iter_mut().filter(|b| b.car_image.is_empty()) {
            if let Some(image) = images.get(&booking.car_id) {
                booking.car_image = image.clone();
            }
        }
        Ok(())
    }

    /// Set any status on a booking
    pub async fn update_status(&self, id: &str, status: &str) -> Result<Booking, BookingServiceError> {
        let status = parse_status(status)?;
        let updated = self
            .bookings
            .update_status(id, status)
            .await
            .context("Failed to update booking status")?;
        if !updated {
            return Err(BookingServiceError::NotFound("Booking not found".to_string()));
        }
        self.bookings
            .get_by_id(id)
            .await
            .context("Failed to get booking")?
            .ok_or_else(|| BookingServiceError::NotFound("Booking not found".to_string()))
    }

    pub async fn delete(&self, id: &str) -> Result<(), BookingServiceError> {
        let deleted = self.bookings.delete(id).await.context("Failed to delete booking")?;
        if !deleted {
            return Err(BookingServiceError::NotFound("Booking not found".to_string()));
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, BookingServiceError> {
        Ok(self.bookings.count().await.context("Failed to count bookings")?)
    }

    pub async fn count_by_status(&self) -> Result<HashMap<BookingStatus, i64>, BookingServiceError> {
        Ok(self
            .bookings
            .count_by_status()
            .await
            .context("Failed to count bookings by status")?)
    }
}

fn parse_status(value: &str) -> Result<BookingStatus, BookingServiceError> {
    value
        .parse()
        .map_err(|e: anyhow::Error| BookingServiceError::ValidationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxBookingRepository, SqlxCarRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Insurance, Location};
    use crate::services::seed::sample_cars;
    use rust_decimal::Decimal;

    async fn setup_test_service() -> (BookingService, Arc<dyn CarRepository>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        let cars = SqlxCarRepository::boxed(pool.clone());
        for car in sample_cars() {
            cars.create(&car).await.unwrap();
        }
        (BookingService::new(SqlxBookingRepository::boxed(pool), cars.clone()), cars)
    }

    fn customer() -> User {
        User::new_phone_user("+37369000000".to_string(), None, "Ana".to_string(), "hash".to_string())
    }

    fn booking_input(car_id: &str) -> CreateBookingInput {
        CreateBookingInput {
            car_id: car_id.to_string(),
            start_date: "2025-08-01".to_string(),
            end_date: "2025-08-05".to_string(),
            start_time: "08:00".to_string(),
            end_time: "19:00".to_string(),
            location: "iasi_airport".to_string(),
            insurance: "rca".to_string(),
            customer_name: "Ana Rusu".to_string(),
            customer_phone: "+37369000000".to_string(),
            customer_age: 30,
        }
    }

    #[tokio::test]
    async fn test_create_booking_prices_and_snapshots() {
        let (service, _cars) = setup_test_service().await;
        let user = customer();
        let booking = service
            .create_booking(&user, booking_input("car_bmw_seria3"))
            .await
            .unwrap();

        assert!(booking.id.starts_with("booking_"));
        assert_eq!(booking.user_id, user.id);
        assert_eq!(booking.car_name, "BMW Seria 3");
        assert_eq!(
            booking.car_image,
            "https://images.unsplash.com/photo-1579317471790-0e30bd51b55e?w=800"
        );
        assert_eq!(booking.location, Location::IasiAirport);
        assert_eq!(booking.insurance, Insurance::Rca);
        // 5 * 45 + 150 + 50
        assert_eq!(booking.total_price, Decimal::from(425));
        assert_eq!(booking.status, BookingStatus::Pending);

        let mine = service.list_for_user(&user).await.unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn test_create_booking_failures_write_nothing() {
        let (service, _cars) = setup_test_service().await;
        let user = customer();

        let missing = service.create_booking(&user, booking_input("car_missing")).await;
        assert!(matches!(missing, Err(BookingServiceError::NotFound(_))));

        let mut backwards = booking_input("car_bmw_seria3");
        backwards.end_date = "2025-07-31".to_string();
        let result = service.create_booking(&user, backwards).await;
        assert!(matches!(result, Err(BookingServiceError::InvalidRange)));

        let mut bad_location = booking_input("car_bmw_seria3");
        bad_location.location = "moon".to_string();
        let result = service.create_booking(&user, bad_location).await;
        assert!(matches!(result, Err(BookingServiceError::ValidationError(_))));

        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_booking_stores_parsed_choices() {
        let (service, _cars) = setup_test_service().await;
        let mut input = booking_input("car_skoda_octavia");
        input.location = "chisinau_airport".to_string();
        input.insurance = "casco".to_string();
        let booking = service.create_booking(&customer(), input).await.unwrap();
        assert_eq!(booking.location, Location::ChisinauAirport);
        assert_eq!(booking.insurance, Insurance::Casco);
    }

    #[tokio::test]
    async fn test_overlapping_bookings_are_accepted() {
        let (service, _cars) = setup_test_service().await;
        let user = customer();
        service.create_booking(&user, booking_input("car_audi_a4")).await.unwrap();
        service.create_booking(&user, booking_input("car_audi_a4")).await.unwrap();
        assert_eq!(service.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_status_updates_any_direction() {
        let (service, _cars) = setup_test_service().await;
        let booking = service
            .create_booking(&customer(), booking_input("car_vw_passat"))
            .await
            .unwrap();

        let done = service.update_status(&booking.id, "completed").await.unwrap();
        assert_eq!(done.status, BookingStatus::Completed);
        let back = service.update_status(&booking.id, "pending").await.unwrap();
        assert_eq!(back.status, BookingStatus::Pending);

        assert!(matches!(
            service.update_status(&booking.id, "lost").await,
            Err(BookingServiceError::ValidationError(_))
        ));
        assert!(matches!(
            service.update_status("booking_missing", "confirmed").await,
            Err(BookingServiceError::NotFound(_))
        ));

        let counts = service.count_by_status().await.unwrap();
        assert_eq!(counts.get(&BookingStatus::Pending), Some(&1));
    }

    #[tokio::test]
    async fn test_admin_list_fills_missing_image_without_writing() {
        let (service, cars) = setup_test_service().await;
        let mut car = cars.get_by_id("car_skoda_octavia").await.unwrap().unwrap();
        let images = std::mem::take(&mut car.images);
        cars.update(&car).await.unwrap();

        let user = customer();
        let booking = service
            .create_booking(&user, booking_input("car_skoda_octavia"))
            .await
            .unwrap();
        assert_eq!(booking.car_image, "");

        car.images = images;
        cars.update(&car).await.unwrap();

        let listed = service.list_all(None).await.unwrap();
        assert_eq!(listed[0].car_image, car.display_image());
        assert_eq!(service.list_for_user(&user).await.unwrap()[0].car_image, "");

        assert_eq!(service.list_all(Some("pending")).await.unwrap().len(), 1);
        assert!(service.list_all(Some("confirmed")).await.unwrap().is_empty());
        assert!(service.list_all(Some("nope")).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_and_recent() {
        let (service, _cars) = setup_test_service().await;
        let user = customer();
        for _ in 0..3 {
            service.create_booking(&user, booking_input("car_toyota_corolla")).await.unwrap();
        }
        assert_eq!(service.recent(2).await.unwrap().len(), 2);

        let first = service.recent(1).await.unwrap().remove(0);
        service.delete(&first.id).await.unwrap();
        assert!(matches!(service.delete(&first.id).await, Err(BookingServiceError::NotFound(_))));
        assert_eq!(service.count().await.unwrap(), 2);
    }
}

//! Car service
//!
//! Catalog reads are cached per filter and per id; every admin mutation
//! drops all `cars:` entries.

use crate::cache::{keys, CacheLayer, SharedCache};
use crate::db::repositories::CarRepository;
use crate::models::{Car, CarFilter, CarInput, UpdateCarInput};
use crate::services::pricing::{quote_car, PriceQuote, PricingError, QuoteRequest};
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Error types for car service operations
#[derive(Debug, thiserror::Error)]
pub enum CarServiceError {
    #[error("Car not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid date range")]
    InvalidRange,

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<PricingError> for CarServiceError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::InvalidRange => Self::InvalidRange,
            PricingError::Invalid(message) => Self::ValidationError(message),
        }
    }
}

/// Quote response for a specific car
#[derive(Debug, Clone, Serialize)]
pub struct CarQuote {
    pub car_id: String,
    #[serde(flatten)]
    pub quote: PriceQuote,
}

pub struct CarService {
    repo: Arc<dyn CarRepository>,
    cache: SharedCache,
    cache_ttl: Duration,
}

impl CarService {
    pub fn new(repo: Arc<dyn CarRepository>, cache: SharedCache) -> Self {
        let cache_ttl = cache.default_ttl();
        Self {
            repo,
            cache,
            cache_ttl,
        }
    }

    /// List cars matching `filter`, ordered by `order` then name
    pub async fn list(&self, filter: &CarFilter) -> Result<Vec<Car>, CarServiceError> {
        let cache_key = format!("{}{}", keys::CARS_LIST, filter.cache_key());
        if let Some(cars) = self.cache.get::<Vec<Car>>(&cache_key).await.ok().flatten() {
            return Ok(cars);
        }

        let cars = self.repo.list(filter).await.context("Failed to list cars")?;
        let _ = self.cache.set(&cache_key, &cars, self.cache_ttl).await;
        Ok(cars)
    }

    pub async fn get(&self, id: &str) -> Result<Car, CarServiceError> {
        let cache_key = format!("{}{}", keys::CAR_BY_ID, id);
        if let Some(car) = self.cache.get::<Car>(&cache_key).await.ok().flatten() {
            return Ok(car);
        }

        let car = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get car")?
            .ok_or_else(|| CarServiceError::NotFound(id.to_string()))?;
        let _ = self.cache.set(&cache_key, &car, self.cache_ttl).await;
        Ok(car)
    }

    pub async fn create(&self, input: CarInput) -> Result<Car, CarServiceError> {
        let car = input.into_car().map_err(CarServiceError::ValidationError)?;
        let car = self.repo.create(&car).await.context("Failed to create car")?;
        self.invalidate_cache().await?;
        tracing::info!("Created car {}", car.id);
        Ok(car)
    }

    /// Apply a partial update. An empty update is rejected.
    pub async fn update(&self, id: &str, input: UpdateCarInput) -> Result<Car, CarServiceError> {
        if input.is_empty() {
            return Err(CarServiceError::ValidationError("No fields to update".to_string()));
        }

        let existing = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get car")?
            .ok_or_else(|| CarServiceError::NotFound(id.to_string()))?;
        let updated = input
            .apply_to(&existing)
            .map_err(CarServiceError::ValidationError)?;
        let car = self.repo.update(&updated).await.context("Failed to update car")?;
        self.invalidate_cache().await?;
        Ok(car)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CarServiceError> {
        let deleted = self.repo.delete(id).await.context("Failed to delete car")?;
        if !deleted {
            return Err(CarServiceError::NotFound(id.to_string()));
        }
        self.invalidate_cache().await?;
        tracing::info!("Deleted car {}", id);
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, CarServiceError> {
        Ok(self.repo.count().await.context("Failed to count cars")?)
    }

    /// Price a rental of the requested car
    pub async fn quote(&self, request: &QuoteRequest) -> Result<CarQuote, CarServiceError> {
        let car = self.get(&request.car_id).await?;
        let quote = quote_car(&car, request)?;
        Ok(CarQuote {
            car_id: car.id,
            quote,
        })
    }

    /// Drop every cached catalog entry
    pub async fn invalidate_cache(&self) -> Result<(), CarServiceError> {
        self.cache
            .delete_pattern("cars:*")
            .await
            .context("Failed to invalidate car cache")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::CacheConfig;
    use crate::db::repositories::SqlxCarRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::Transmission;
    use rust_decimal::Decimal;

    async fn setup_test_service() -> CarService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        CarService::new(SqlxCarRepository::boxed(pool), create_cache(&CacheConfig::default()))
    }

    fn car_input(name: &str) -> CarInput {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "brand": "Dacia",
            "model": "Logan",
            "year": 2021,
            "transmission": "manual",
            "fuel": "petrol",
            "seats": 5,
            "images": ["a.jpg", "b.jpg"],
            "main_image_index": 1,
            "pricing": {"day_1": 30, "day_3": 28, "day_5": 26, "day_10": 24, "day_20": 20},
            "casco_price": 8
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_get_and_list() {
        let service = setup_test_service().await;
        let car = service.create(car_input("Dacia Logan")).await.unwrap();
        assert!(car.id.starts_with("car_"));

        let fetched = service.get(&car.id).await.unwrap();
        assert_eq!(fetched.name, "Dacia Logan");
        assert_eq!(fetched.display_image(), "b.jpg");

        let filter = CarFilter {
            available_only: true,
            ..Default::default()
        };
        assert_eq!(service.list(&filter).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mutations_invalidate_cached_reads() {
        let service = setup_test_service().await;
        let filter = CarFilter {
            available_only: true,
            ..Default::default()
        };
        assert!(service.list(&filter).await.unwrap().is_empty());

        let car = service.create(car_input("Dacia Logan")).await.unwrap();
        assert_eq!(service.list(&filter).await.unwrap().len(), 1);
        service.get(&car.id).await.unwrap();

        let update = UpdateCarInput {
            available: Some(false),
            transmission: Some("automatic".to_string()),
            ..Default::default()
        };
        let updated = service.update(&car.id, update).await.unwrap();
        assert_eq!(updated.transmission, Transmission::Automatic);
        assert!(service.list(&filter).await.unwrap().is_empty());
        assert!(!service.get(&car.id).await.unwrap().available);

        service.delete(&car.id).await.unwrap();
        assert!(matches!(service.get(&car.id).await, Err(CarServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_errors() {
        let service = setup_test_service().await;
        let car = service.create(car_input("Dacia Logan")).await.unwrap();

        let empty = service.update(&car.id, UpdateCarInput::default()).await;
        assert!(matches!(empty, Err(CarServiceError::ValidationError(_))));

        let bad_fuel = UpdateCarInput {
            fuel: Some("steam".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&car.id, bad_fuel).await,
            Err(CarServiceError::ValidationError(_))
        ));

        let missing = UpdateCarInput {
            seats: Some(4),
            ..Default::default()
        };
        assert!(matches!(
            service.update("car_missing", missing).await,
            Err(CarServiceError::NotFound(_))
        ));
        assert!(matches!(service.delete("car_missing").await, Err(CarServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_car() {
        let service = setup_test_service().await;
        let mut input = car_input("Broken");
        input.seats = 0;
        assert!(matches!(service.create(input).await, Err(CarServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_quote() {
        let service = setup_test_service().await;
        let car = service.create(car_input("Dacia Logan")).await.unwrap();
        let request = QuoteRequest {
            car_id: car.id.clone(),
            start_date: "2025-07-01".to_string(),
            end_date: "2025-07-05".to_string(),
            start_time: "08:00".to_string(),
            end_time: "12:00".to_string(),
            location: "iasi_airport".to_string(),
            insurance: "rca".to_string(),
        };
        let quote = service.quote(&request).await.unwrap();
        assert_eq!(quote.car_id, car.id);
        assert_eq!(quote.quote.days, 5);
        // 5 * 26 + 150 + 25
        assert_eq!(quote.quote.total_price, Decimal::from(305));

        let missing = QuoteRequest {
            car_id: "car_missing".to_string(),
            ..request.clone()
        };
        assert!(matches!(service.quote(&missing).await, Err(CarServiceError::NotFound(_))));

        let backwards = QuoteRequest {
            end_date: "2025-06-30".to_string(),
            ..request
        };
        assert!(matches!(service.quote(&backwards).await, Err(CarServiceError::InvalidRange)));
    }
}

//! Sample catalog
//!
//! Six cars with fixed ids, inserted only into an empty catalog.

use crate::cache::{CacheLayer, SharedCache};
use crate::db::repositories::CarRepository;
use crate::models::{BodyType, Car, Fuel, Tariff, Transmission};
use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Outcome of a seed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The catalog already held this many cars
    AlreadySeeded(i64),
    /// This many sample cars were inserted
    Seeded(usize),
}

impl SeedOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::AlreadySeeded(n) => format!("Database already has {} cars", n),
            Self::Seeded(n) => format!("Seeded {} cars", n),
        }
    }
}

/// Insert the sample catalog when no cars exist
pub async fn seed_catalog(cars: &Arc<dyn CarRepository>, cache: &SharedCache) -> Result<SeedOutcome> {
    let existing = cars.count().await.context("Failed to count cars")?;
    if existing > 0 {
        return Ok(SeedOutcome::AlreadySeeded(existing));
    }

    let samples = sample_cars();
    let count = samples.len();
    for car in &samples {
        cars.create(car).await.with_context(|| format!("Failed to seed car {}", car.id))?;
    }
    cache.delete_pattern("cars:*").await?;
    tracing::info!("Seeded {} sample cars", count);
    Ok(SeedOutcome::Seeded(count))
}

struct Sample {
    id: &'static str,
    name: &'static str,
    brand: &'static str,
    model: &'static str,
    year: i32,
    transmission: Transmission,
    fuel: Fuel,
    images: &'static [&'static str],
    rates: [i64; 5],
    casco: i64,
    specs: Value,
}

/// The sample cars, in catalog order
pub fn sample_cars() -> Vec<Car> {
    let samples = [
        Sample {
            id: "car_bmw_seria3",
            name: "BMW Seria 3",
            brand: "BMW",
            model: "320d",
            year: 2023,
            transmission: Transmission::Automatic,
            fuel: Fuel::Diesel,
            images: &[
                "https://images.unsplash.com/photo-1579317471790-0e30bd51b55e?w=800",
                "https://images.unsplash.com/photo-1717082832138-b8f332d86a2a?w=800",
            ],
            rates: [55, 50, 45, 40, 35],
            casco: 15,
            specs: json!({
                "engine": "2.0L Turbo Diesel", "power": "190 CP", "consumption": "5.5L/100km",
                "trunk": "480L", "ac": true, "gps": true, "bluetooth": true
            }),
        },
        Sample {
            id: "car_mercedes_cclass",
            name: "Mercedes-Benz C-Class",
            brand: "Mercedes-Benz",
            model: "C200",
            year: 2023,
            transmission: Transmission::Automatic,
            fuel: Fuel::Petrol,
            images: &[
                "https://images.unsplash.com/photo-1618836436067-3665afbc4ee9?w=800",
                "https://images.unsplash.com/photo-1582733460601-0ae67a942777?w=800",
            ],
            rates: [65, 58, 52, 45, 40],
            casco: 18,
            specs: json!({
                "engine": "2.0L Turbo", "power": "204 CP", "consumption": "7.0L/100km",
                "trunk": "455L", "ac": true, "gps": true, "bluetooth": true, "leather_seats": true
            }),
        },
        Sample {
            id: "car_audi_a4",
            name: "Audi A4",
            brand: "Audi",
            model: "A4 35 TDI",
            year: 2022,
            transmission: Transmission::Automatic,
            fuel: Fuel::Diesel,
            images: &[
                "https://images.unsplash.com/photo-1603623627643-9742fd3d0349?w=800",
                "https://images.unsplash.com/photo-1558661091-5cc1b64d0dc5?w=800",
            ],
            rates: [60, 55, 48, 42, 38],
            casco: 16,
            specs: json!({
                "engine": "2.0L TDI", "power": "163 CP", "consumption": "5.2L/100km",
                "trunk": "460L", "ac": true, "gps": true, "bluetooth": true, "cruise_control": true
            }),
        },
        Sample {
            id: "car_vw_passat",
            name: "Volkswagen Passat",
            brand: "Volkswagen",
            model: "Passat 2.0 TDI",
            year: 2022,
            transmission: Transmission::Automatic,
            fuel: Fuel::Diesel,
            images: &["https://images.unsplash.com/photo-1720907662942-f552fa04eb3b?w=800"],
            rates: [45, 40, 35, 32, 28],
            casco: 12,
            specs: json!({
                "engine": "2.0L TDI", "power": "150 CP", "consumption": "5.0L/100km",
                "trunk": "586L", "ac": true, "gps": true, "bluetooth": true
            }),
        },
        Sample {
            id: "car_toyota_corolla",
            name: "Toyota Corolla",
            brand: "Toyota",
            model: "Corolla Hybrid",
            year: 2023,
            transmission: Transmission::Automatic,
            fuel: Fuel::Hybrid,
            images: &["https://images.unsplash.com/photo-1720907662945-7a10856cd0d4?w=800"],
            rates: [40, 35, 32, 28, 25],
            casco: 10,
            specs: json!({
                "engine": "1.8L Hybrid", "power": "122 CP", "consumption": "4.5L/100km",
                "trunk": "361L", "ac": true, "gps": true, "bluetooth": true, "eco_mode": true
            }),
        },
        Sample {
            id: "car_skoda_octavia",
            name: "Skoda Octavia",
            brand: "Skoda",
            model: "Octavia 1.5 TSI",
            year: 2023,
            transmission: Transmission::Manual,
            fuel: Fuel::Petrol,
            images: &["https://images.unsplash.com/photo-1680425210909-d1680d778e76?w=800"],
            rates: [35, 32, 28, 25, 22],
            casco: 10,
            specs: json!({
                "engine": "1.5L TSI", "power": "150 CP", "consumption": "6.0L/100km",
                "trunk": "600L", "ac": true, "bluetooth": true
            }),
        },
    ];

    let now = Utc::now();
    samples
        .into_iter()
        .map(|s| {
            let [day_1, day_3, day_5, day_10, day_20] = s.rates.map(Decimal::from);
            Car {
                id: s.id.to_string(),
                name: s.name.to_string(),
                brand: s.brand.to_string(),
                model: s.model.to_string(),
                year: s.year,
                body_type: BodyType::Sedan,
                transmission: s.transmission,
                fuel: s.fuel,
                seats: 5,
                images: s.images.iter().map(|i| i.to_string()).collect(),
                main_image_index: 0,
                pricing: Tariff {
                    day_1,
                    day_3,
                    day_5,
                    day_10,
                    day_20,
                },
                casco_price: Decimal::from(s.casco),
                description: String::new(),
                specs: match s.specs {
                    Value::Object(map) => map,
                    _ => Map::new(),
                },
                sort_order: 0,
                available: true,
                created_at: now,
            }
        })
        .collect()
}

//! Car catalog model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

string_enum! {
    BodyType, "body type" {
        Sedan => "sedan",
        Suv => "suv",
        Hatchback => "hatchback",
        Minivan => "minivan",
        Coupe => "coupe",
        Universal => "universal",
    }
}

string_enum! {
    Transmission, "transmission" {
        Manual => "manual",
        Automatic => "automatic",
    }
}

string_enum! {
    Fuel, "fuel" {
        Diesel => "diesel",
        Petrol => "petrol",
        Electric => "electric",
        Hybrid => "hybrid",
    }
}

/// Five day-count tiers of daily rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tariff {
    pub day_1: Decimal,
    pub day_3: Decimal,
    pub day_5: Decimal,
    pub day_10: Decimal,
    pub day_20: Decimal,
}

impl Tariff {
    pub fn rates(&self) -> [Decimal; 5] {
        [self.day_1, self.day_3, self.day_5, self.day_10, self.day_20]
    }
}

/// A car in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    #[serde(rename = "car_id")]
    pub id: String,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub body_type: BodyType,
    pub transmission: Transmission,
    pub fuel: Fuel,
    pub seats: i32,
    pub images: Vec<String>,
    pub main_image_index: i64,
    pub pricing: Tariff,
    /// Daily CASCO surcharge
    pub casco_price: Decimal,
    pub description: String,
    pub specs: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl Car {
    /// Image shown for this car: the main image when its index is in range,
    /// otherwise the first image, otherwise empty.
    pub fn display_image(&self) -> String {
        usize::try_from(self.main_image_index)
            .ok()
            .and_then(|i| self.images.get(i))
            .or_else(|| self.images.first())
            .cloned()
            .unwrap_or_default()
    }
}

/// Catalog listing filter
#[derive(Debug, Clone, Default)]
pub struct CarFilter {
    /// Case-insensitive substring of the brand
    pub brand: Option<String>,
    pub transmission: Option<Transmission>,
    pub fuel: Option<Fuel>,
    pub body_type: Option<BodyType>,
    pub min_seats: Option<i32>,
    pub available_only: bool,
}

impl CarFilter {
    /// Stable key for caching this filter's result
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.brand.as_deref().map(str::to_lowercase).unwrap_or_default(),
            self.transmission.map(|t| t.as_str()).unwrap_or(""),
            self.fuel.map(|f| f.as_str()).unwrap_or(""),
            self.body_type.map(|b| b.as_str()).unwrap_or(""),
            self.min_seats.map(|s| s.to_string()).unwrap_or_default(),
            self.available_only,
        )
    }
}

fn default_body_type() -> String {
    BodyType::Sedan.as_str().to_string()
}

fn default_true() -> bool {
    true
}

/// Full car body for creation. Enum fields arrive as strings and are
/// checked by [`CarInput::into_car`].
#[derive(Debug, Clone, Deserialize)]
pub struct CarInput {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    #[serde(default = "default_body_type")]
    pub body_type: String,
    pub transmission: String,
    pub fuel: String,
    pub seats: i32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub main_image_index: i64,
    pub pricing: Tariff,
    pub casco_price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub specs: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub available: bool,
}

impl CarInput {
    /// Validate and build a new car with a fresh `car_` id
    pub fn into_car(self) -> Result<Car, String> {
        let car = Car {
            id: super::new_id("car"),
            name: self.name,
            brand: self.brand,
            model: self.model,
            year: self.year,
            body_type: parse_field(&self.body_type)?,
            transmission: parse_field(&self.transmission)?,
            fuel: parse_field(&self.fuel)?,
            seats: self.seats,
            images: self.images,
            main_image_index: self.main_image_index,
            pricing: self.pricing,
            casco_price: self.casco_price,
            description: self.description,
            specs: self.specs,
            sort_order: self.order,
            available: self.available,
            created_at: Utc::now(),
        };
        validate_car(&car)?;
        Ok(car)
    }
}

/// Partial car update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCarInput {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub body_type: Option<String>,
    pub transmission: Option<String>,
    pub fuel: Option<String>,
    pub seats: Option<i32>,
    pub images: Option<Vec<String>>,
    pub main_image_index: Option<i64>,
    pub pricing: Option<Tariff>,
    pub casco_price: Option<Decimal>,
    pub description: Option<String>,
    pub specs: Option<serde_json::Map<String, serde_json::Value>>,
    pub order: Option<i32>,
    pub available: Option<bool>,
}

impl UpdateCarInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.brand.is_none()
            && self.model.is_none()
            && self.year.is_none()
            && self.body_type.is_none()
            && self.transmission.is_none()
            && self.fuel.is_none()
            && self.seats.is_none()
            && self.images.is_none()
            && self.main_image_index.is_none()
            && self.pricing.is_none()
            && self.casco_price.is_none()
            && self.description.is_none()
            && self.specs.is_none()
            && self.order.is_none()
            && self.available.is_none()
    }

    /// Apply the provided fields to `car`, leaving it untouched on error
    pub fn apply_to(self, car: &Car) -> Result<Car, String> {
        let mut updated = car.clone();
        if let Some(v) = self.name {
            updated.name = v;
        }
        if let Some(v) = self.brand {
            updated.brand = v;
        }
        if let Some(v) = self.model {
            updated.model = v;
        }
        if let Some(v) = self.year {
            updated.year = v;
        }
        if let Some(v) = self.body_type {
            updated.body_type = parse_field(&v)?;
        }
        if let Some(v) = self.transmission {
            updated.transmission = parse_field(&v)?;
        }
        if let Some(v) = self.fuel {
            updated.fuel = parse_field(&v)?;
        }
        if let Some(v) = self.seats {
            updated.seats = v;
        }
        if let Some(v) = self.images {
            updated.images = v;
        }
        if let Some(v) = self.main_image_index {
            updated.main_image_index = v;
        }
        if let Some(v) = self.pricing {
            updated.pricing = v;
        }
        if let Some(v) = self.casco_price {
            updated.casco_price = v;
        }
        if let Some(v) = self.description {
            updated.description = v;
        }
        if let Some(v) = self.specs {
            updated.specs = v;
        }
        if let Some(v) = self.order {
            updated.sort_order = v;
        }
        if let Some(v) = self.available {
            updated.available = v;
        }
        validate_car(&updated)?;
        Ok(updated)
    }
}

fn parse_field<T: FromStr<Err = anyhow::Error>>(value: &str) -> Result<T, String> {
    value.parse::<T>().map_err(|e| e.to_string())
}

fn validate_car(car: &Car) -> Result<(), String> {
    if car.name.trim().is_empty() {
        return Err("Car name cannot be empty".to_string());
    }
    if car.seats < 1 {
        return Err("Seats must be at least 1".to_string());
    }
    if car.main_image_index < 0 {
        return Err("main_image_index cannot be negative".to_string());
    }
    if car.pricing.rates().iter().any(|r| r.is_sign_negative()) || car.casco_price.is_sign_negative() {
        return Err("Prices cannot be negative".to_string());
    }
    Ok(())
}

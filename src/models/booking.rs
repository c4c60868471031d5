//! Booking model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

string_enum! {
    /// Insurance choice. RCA is the baseline with no surcharge.
    Insurance, "insurance" {
        Rca => "rca",
        Casco => "casco",
    }
}

string_enum! {
    /// Pickup and return location
    Location, "location" {
        Office => "office",
        ChisinauAirport => "chisinau_airport",
        IasiAirport => "iasi_airport",
    }
}

string_enum! {
    /// Booking lifecycle status. Admins may set any status directly.
    BookingStatus, "booking status" {
        Pending => "pending",
        Confirmed => "confirmed",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

/// A persisted reservation.
///
/// `car_name` and `car_image` are snapshots taken at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "booking_id")]
    pub id: String,
    pub user_id: String,
    pub car_id: String,
    pub car_name: String,
    pub car_image: String,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: Location,
    pub insurance: Insurance,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_age: i32,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Booking request body
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingInput {
    pub car_id: String,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub insurance: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_age: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_location_values() {
        assert_eq!(Location::from_str("iasi_airport").unwrap(), Location::IasiAirport);
        assert_eq!(Location::ChisinauAirport.to_string(), "chisinau_airport");
        assert!(Location::from_str("Iasi Airport").is_err());
    }

    #[test]
    fn test_status_serde_matches_display() {
        for status in BookingStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.as_str());
        }
        assert_eq!(BookingStatus::default(), BookingStatus::Pending);
    }

    #[test]
    fn test_insurance_default_is_rca() {
        assert_eq!(Insurance::default(), Insurance::Rca);
        assert!(Insurance::from_str("full").is_err());
    }
}

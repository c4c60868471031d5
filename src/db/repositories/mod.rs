//! Database repositories
//!
//! One repository per stored entity. Each exposes an `#[async_trait]` trait
//! so services can be handed any implementation, plus a `Sqlx*` type backed
//! by the shared pool.

pub mod banner;
pub mod booking;
pub mod car;
pub mod contact;
pub mod faq;
pub mod legal;
pub mod partner_request;
pub mod session;
pub mod user;

pub use banner::{BannerRepository, SqlxBannerRepository};
pub use booking::{BookingRepository, SqlxBookingRepository};
pub use car::{CarRepository, SqlxCarRepository};
pub use contact::{ContactRepository, SqlxContactRepository};
pub use faq::{FaqRepository, SqlxFaqRepository};
pub use legal::{LegalRepository, SqlxLegalRepository};
pub use partner_request::{PartnerRequestRepository, SqlxPartnerRequestRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserField, UserRepository};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Format a timestamp for storage. Fixed width, so text order is time order.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp. Values without a zone are taken as UTC.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(anyhow!("Invalid stored timestamp: {}", value))
}

pub(crate) fn parse_decimal(value: &str) -> Result<Decimal> {
    Decimal::from_str(value).with_context(|| format!("Invalid stored amount: {}", value))
}

pub(crate) fn parse_enum<T: FromStr<Err = anyhow::Error>>(value: &str) -> Result<T> {
    value.parse::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_parse_timestamp_with_offset() {
        let ts = parse_timestamp("2024-05-01T12:00:00+03:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_timestamp_as_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-01T12:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-05-01 12:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-05-01T12:30:00.000").unwrap(), expected);
    }

    #[test]
    fn test_format_then_parse_preserves_instant() {
        let now = Utc::now();
        let parsed = parse_timestamp(&format_timestamp(&now)).unwrap();
        assert!((parsed - now).abs() < Duration::milliseconds(1));
    }

    #[test]
    fn test_formatted_timestamps_sort_chronologically() {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let later = base + Duration::milliseconds(500);
        assert!(format_timestamp(&base) < format_timestamp(&later));
        assert_eq!(format_timestamp(&base), "2024-05-01T12:00:00.000000Z");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_decimal("12,5").is_err());
        assert_eq!(parse_decimal("12.50").unwrap(), Decimal::new(1250, 2));
    }
}

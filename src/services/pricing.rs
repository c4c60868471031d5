//! Price quoting
//!
//! Pure computation from a car's tariff and a rental request to an itemized
//! quote. All amounts are `Decimal`.
//!
//! - days: inclusive calendar days, `(end - start) + 1`
//! - base: the rate of the highest tier reached (20, 10, 5, 3, 1 days) times days
//! - CASCO: the car's daily CASCO rate times days, zero for RCA
//! - location: 150 for Iasi airport
//! - off-hours: 25 each for pickup and return outside 09:00-18:00

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Car, Insurance, Location, Tariff};

const IASI_AIRPORT_FEE: i64 = 150;
const OFF_HOURS_FEE: i64 = 25;
const OPENING_HOUR: u32 = 9;
const CLOSING_HOUR: u32 = 18;

/// Error types for price quoting
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PricingError {
    /// The rental would last less than one day
    #[error("Invalid date range")]
    InvalidRange,

    /// A date, time or enumerated field could not be parsed
    #[error("{0}")]
    Invalid(String),
}

/// Day-count tier whose rate applies to the whole rental
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    OneDay,
    ThreeDays,
    FiveDays,
    TenDays,
    TwentyDays,
}

impl Tier {
    /// Highest tier whose threshold `days` reaches
    pub fn for_days(days: i64) -> Self {
        match days {
            d if d >= 20 => Tier::TwentyDays,
            d if d >= 10 => Tier::TenDays,
            d if d >= 5 => Tier::FiveDays,
            d if d >= 3 => Tier::ThreeDays,
            _ => Tier::OneDay,
        }
    }

    pub fn rate(self, tariff: &Tariff) -> Decimal {
        match self {
            Tier::OneDay => tariff.day_1,
            Tier::ThreeDays => tariff.day_3,
            Tier::FiveDays => tariff.day_5,
            Tier::TenDays => tariff.day_10,
            Tier::TwentyDays => tariff.day_20,
        }
    }
}

/// Pickup and return schedule of a rental
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentalPeriod {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl RentalPeriod {
    /// Parse ISO dates (`YYYY-MM-DD`, optionally with a time part) and
    /// `HH:MM` clock times
    pub fn parse(
        start_date: &str,
        end_date: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<Self, PricingError> {
        Ok(Self {
            start: parse_date(start_date)?,
            end: parse_date(end_date)?,
            start_time: parse_clock(start_time)?,
            end_time: parse_clock(end_time)?,
        })
    }

    /// Inclusive day count. Partial days round down before the `+ 1`.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_seconds().div_euclid(86_400) + 1
    }
}

fn parse_date(value: &str) -> Result<NaiveDateTime, PricingError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::default()));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| PricingError::Invalid(format!("Invalid date: {}", value)))
}

fn parse_clock(value: &str) -> Result<NaiveTime, PricingError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| PricingError::Invalid(format!("Invalid time: {}", value)))
}

/// Whether a pickup or return at `time` falls outside opening hours
pub fn is_off_hours(time: NaiveTime) -> bool {
    let hour = time.hour();
    hour < OPENING_HOUR || hour >= CLOSING_HOUR
}

/// Itemized components echoed back for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub daily_rate: Decimal,
    pub days: i64,
    pub base: Decimal,
    pub casco: Decimal,
    pub location: Decimal,
    pub outside_hours: Decimal,
}

/// A computed price quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub days: i64,
    pub base_price: Decimal,
    pub casco_price: Decimal,
    pub location_fee: Decimal,
    pub outside_hours_fee: Decimal,
    pub total_price: Decimal,
    pub breakdown: PriceBreakdown,
}

/// Quote a rental of a car with `tariff` and daily CASCO rate `casco_rate`
pub fn quote(
    tariff: &Tariff,
    casco_rate: Decimal,
    period: &RentalPeriod,
    location: Location,
    insurance: Insurance,
) -> Result<PriceQuote, PricingError> {
    let days = period.days();
    if days < 1 {
        return Err(PricingError::InvalidRange);
    }
    let day_count = Decimal::from(days);

    let daily_rate = Tier::for_days(days).rate(tariff);
    let base_price = daily_rate * day_count;

    let casco_price = match insurance {
        Insurance::Casco => casco_rate * day_count,
        Insurance::Rca => Decimal::ZERO,
    };

    let location_fee = match location {
        Location::IasiAirport => Decimal::from(IASI_AIRPORT_FEE),
        Location::Office | Location::ChisinauAirport => Decimal::ZERO,
    };

    let outside_hours_fee: Decimal = [period.start_time, period.end_time]
        .into_iter()
        .filter(|t| is_off_hours(*t))
        .map(|_| Decimal::from(OFF_HOURS_FEE))
        .sum();

    let total_price = base_price + casco_price + location_fee + outside_hours_fee;

    Ok(PriceQuote {
        days,
        base_price,
        casco_price,
        location_fee,
        outside_hours_fee,
        total_price,
        breakdown: PriceBreakdown {
            daily_rate,
            days,
            base: base_price,
            casco: casco_price,
            location: location_fee,
            outside_hours: outside_hours_fee,
        },
    })
}

/// Raw request fields of a price quote, as sent by clients
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub car_id: String,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub insurance: String,
}

/// A quote request with every field parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentalTerms {
    pub period: RentalPeriod,
    pub location: Location,
    pub insurance: Insurance,
}

impl RentalTerms {
    /// Quote these terms against `car`'s tariff
    pub fn quote(&self, car: &Car) -> Result<PriceQuote, PricingError> {
        quote(&car.pricing, car.casco_price, &self.period, self.location, self.insurance)
    }
}

impl QuoteRequest {
    /// Parse the period, then the location, then the insurance
    pub fn terms(&self) -> Result<RentalTerms, PricingError> {
        let period = RentalPeriod::parse(
            &self.start_date,
            &self.end_date,
            &self.start_time,
            &self.end_time,
        )?;
        let location = self
            .location
            .parse()
            .map_err(|e: anyhow::Error| PricingError::Invalid(e.to_string()))?;
        let insurance = self
            .insurance
            .parse()
            .map_err(|e: anyhow::Error| PricingError::Invalid(e.to_string()))?;
        Ok(RentalTerms { period, location, insurance })
    }
}

/// Parse `request` and quote it against `car`'s tariff
pub fn quote_car(car: &Car, request: &QuoteRequest) -> Result<PriceQuote, PricingError> {
    request.terms()?.quote(car)
}

//! Admin dashboard statistics

use crate::models::{Booking, BookingStatus};
use crate::services::{BookingService, CarService, PartnerRequestService, UserService};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

const RECENT_BOOKINGS: i64 = 5;

/// Dashboard snapshot
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_cars: i64,
    pub total_bookings: i64,
    /// Non-admin accounts
    pub total_users: i64,
    pub pending_bookings: i64,
    pub pending_partners: i64,
    /// Count for each of the four booking statuses
    pub booking_stats: BTreeMap<&'static str, i64>,
    pub recent_bookings: Vec<Booking>,
}

/// Gather the dashboard counters and the newest bookings
pub async fn dashboard(
    cars: &CarService,
    bookings: &BookingService,
    users: &UserService,
    partners: &PartnerRequestService,
) -> Result<DashboardStats> {
    let by_status = bookings.count_by_status().await?;
    let booking_stats: BTreeMap<&'static str, i64> = BookingStatus::ALL
        .iter()
        .map(|status| (status.as_str(), by_status.get(status).copied().unwrap_or(0)))
        .collect();

    Ok(DashboardStats {
        total_cars: cars.count().await?,
        total_bookings: bookings.count().await?,
        total_users: users.count_customers().await?,
        pending_bookings: booking_stats.get("pending").copied().unwrap_or(0),
        pending_partners: partners.count_pending().await?,
        booking_stats,
        recent_bookings: bookings.recent(RECENT_BOOKINGS).await?,
    })
}

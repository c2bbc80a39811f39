//! API response models for the admin dashboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One day of the reservations-per-day series
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationsPerDay {
    pub day: NaiveDate,
    pub count: i64,
}

/// Lot occupancy breakdown at the time of the request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OccupancyBreakdown {
    pub occupied: i64,
    pub reserved: i64,
    pub available: i64,
    pub unavailable: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardOverviewResponse {
    pub total_users: i64,
    pub total_lots: i64,
    pub total_reservations: i64,
    pub occupancy: OccupancyBreakdown,
    /// Daily reservation counts over the trailing 30 days; days with no
    /// reservations are omitted
    pub reservations_per_day: Vec<ReservationsPerDay>,
}

//! Database models for rate schedules.

use crate::types::{RateScheduleId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Database request for creating a new rate schedule
#[derive(Debug, Clone)]
pub struct RateScheduleCreateDBRequest {
    pub reservation_fee: Decimal,
    pub per_minute_rate: Decimal,
    pub created_by: UserId,
}

/// Database response for a rate schedule
#[derive(Debug, Clone, FromRow)]
pub struct RateScheduleDBResponse {
    pub id: RateScheduleId,
    pub reservation_fee: Decimal,
    pub per_minute_rate: Decimal,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

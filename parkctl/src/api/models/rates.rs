//! API request/response models for rate schedules.

use crate::booking::pricing::RateCard;
use crate::db::models::rates::RateScheduleDBResponse;
use crate::types::{RateScheduleId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RateScheduleCreate {
    #[schema(value_type = f64)]
    pub reservation_fee: Decimal,
    #[schema(value_type = f64)]
    pub per_minute_rate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RateScheduleResponse {
    #[schema(value_type = Option<String>, format = "uuid")]
    pub id: Option<RateScheduleId>,
    #[schema(value_type = f64)]
    pub reservation_fee: Decimal,
    #[schema(value_type = f64)]
    pub per_minute_rate: Decimal,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub created_by: Option<UserId>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<RateScheduleDBResponse> for RateScheduleResponse {
    fn from(db: RateScheduleDBResponse) -> Self {
        Self {
            id: Some(db.id),
            reservation_fee: db.reservation_fee,
            per_minute_rate: db.per_minute_rate,
            created_by: Some(db.created_by),
            created_at: Some(db.created_at),
        }
    }
}

impl RateScheduleResponse {
    /// The configured defaults, reported while no schedule has been created
    pub fn from_defaults(rates: RateCard) -> Self {
        Self {
            id: None,
            reservation_fee: rates.reservation_fee,
            per_minute_rate: rates.per_minute_rate,
            created_by: None,
            created_at: None,
        }
    }
}

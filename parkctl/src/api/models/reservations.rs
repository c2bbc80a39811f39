//! API request/response models for reservations.

use super::pagination::Pagination;
use crate::db::models::reservations::ReservationDBResponse;
use crate::types::{LotId, ReservationId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReservationCreate {
    #[schema(value_type = String, format = "uuid")]
    pub lot_id: LotId,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
    /// Defaults to the plate number on the reserver's profile
    pub plate_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ReservationId,
    #[schema(value_type = String, format = "uuid")]
    pub lot_id: LotId,
    #[schema(value_type = String, format = "uuid")]
    pub reserver: UserId,
    pub plate_number: String,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub ends_at: DateTime<Utc>,
    pub early_end: bool,
    pub created_at: DateTime<Utc>,
}

/// Response for a successful booking: the reservation plus what it cost,
/// so clients can refresh any cached balance without a second request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationCreatedResponse {
    #[serde(flatten)]
    pub reservation: ReservationResponse,
    #[schema(value_type = f64)]
    pub amount_charged: Decimal,
}

/// Query parameters for listing reservations
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListReservationsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub lot_id: Option<LotId>,

    /// Include early-ended reservations (default: true)
    pub include_early_ended: Option<bool>,
}

impl From<ReservationDBResponse> for ReservationResponse {
    fn from(db: ReservationDBResponse) -> Self {
        let ends_at = db.span().ends_at();
        Self {
            id: db.id,
            lot_id: db.lot_id,
            reserver: db.reserver,
            plate_number: db.plate_number,
            starts_at: db.starts_at,
            duration_minutes: db.duration_minutes,
            ends_at,
            early_end: db.early_end,
            created_at: db.created_at,
        }
    }
}

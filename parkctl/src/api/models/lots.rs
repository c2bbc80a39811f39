//! API request/response models for parking lots.

use crate::db::models::lots::{LotCreateDBRequest, LotDBResponse, LotUpdateDBRequest};
use crate::types::LotId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LotCreate {
    pub floor: String,
    pub area: String,
    pub lot_number: i32,
    /// Operational flag; defaults to open for booking
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LotUpdate {
    pub floor: Option<String>,
    pub area: Option<String>,
    pub lot_number: Option<i32>,
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LotResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: LotId,
    pub floor: String,
    pub area: String,
    pub lot_number: i32,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters for listing lots
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListLotsQuery {
    pub floor: Option<String>,
    pub area: Option<String>,
}

/// Query parameters for the availability board
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AvailabilityQuery {
    /// Instant to evaluate the board at; defaults to now
    pub at: Option<DateTime<Utc>>,
}

/// Booking status of a lot at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    /// Operational flag is off; the lot takes no bookings
    Unavailable,
    /// A reservation covers the instant
    Occupied,
    /// Free now, but a reservation starts later
    Reserved,
    /// No active or upcoming reservation
    Available,
}

/// One row of the availability board
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LotAvailabilityResponse {
    #[serde(flatten)]
    pub lot: LotResponse,
    pub status: LotStatus,
}

impl From<LotCreate> for LotCreateDBRequest {
    fn from(api: LotCreate) -> Self {
        Self {
            floor: api.floor,
            area: api.area,
            lot_number: api.lot_number,
            available: api.available,
        }
    }
}

impl From<LotUpdate> for LotUpdateDBRequest {
    fn from(api: LotUpdate) -> Self {
        Self {
            floor: api.floor,
            area: api.area,
            lot_number: api.lot_number,
            available: api.available,
        }
    }
}

impl From<LotDBResponse> for LotResponse {
    fn from(db: LotDBResponse) -> Self {
        Self {
            id: db.id,
            floor: db.floor,
            area: db.area,
            lot_number: db.lot_number,
            available: db.available,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

//! Database models for parking lots.

use crate::types::LotId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a new lot
#[derive(Debug, Clone)]
pub struct LotCreateDBRequest {
    pub floor: String,
    pub area: String,
    pub lot_number: i32,
    pub available: bool,
}

/// Database request for updating a lot
#[derive(Debug, Clone, Default)]
pub struct LotUpdateDBRequest {
    pub floor: Option<String>,
    pub area: Option<String>,
    pub lot_number: Option<i32>,
    pub available: Option<bool>,
}

/// Database response for a lot
#[derive(Debug, Clone, FromRow)]
pub struct LotDBResponse {
    pub id: LotId,
    pub floor: String,
    pub area: String,
    pub lot_number: i32,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

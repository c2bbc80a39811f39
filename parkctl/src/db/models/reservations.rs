//! Database models for reservations.

use crate::booking::conflict::ReservationSpan;
use crate::types::{LotId, ReservationId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a new reservation
#[derive(Debug, Clone)]
pub struct ReservationCreateDBRequest {
    pub lot_id: LotId,
    pub reserver: UserId,
    pub plate_number: String,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
}

/// Database request for updating a reservation.
///
/// Only the early-end flag is mutable after creation.
#[derive(Debug, Clone, Default)]
pub struct ReservationUpdateDBRequest {
    pub early_end: Option<bool>,
}

/// Database response for a reservation
#[derive(Debug, Clone, FromRow)]
pub struct ReservationDBResponse {
    pub id: ReservationId,
    pub lot_id: LotId,
    pub reserver: UserId,
    pub plate_number: String,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub early_end: bool,
    pub created_at: DateTime<Utc>,
}

impl ReservationDBResponse {
    pub fn span(&self) -> ReservationSpan {
        ReservationSpan {
            starts_at: self.starts_at,
            duration_minutes: self.duration_minutes,
        }
    }
}

/// One bucket of the reservations-per-day dashboard series
#[derive(Debug, Clone, FromRow)]
pub struct ReservationsPerDayDBResponse {
    pub day: chrono::NaiveDate,
    pub count: i64,
}

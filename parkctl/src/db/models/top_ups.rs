//! Database models for top-up requests.

use crate::types::{TopUpId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Review state of a top-up request, stored as TEXT in database
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TopUpStatus {
    Pending,
    Credited,
    Rejected,
}

/// Database request for submitting a new top-up
#[derive(Debug, Clone)]
pub struct TopUpCreateDBRequest {
    pub user_id: UserId,
    pub amount: Decimal,
    pub platform: String,
    pub reference_number: String,
}

/// Database response for a top-up request
#[derive(Debug, Clone, FromRow)]
pub struct TopUpDBResponse {
    pub id: TopUpId,
    pub user_id: UserId,
    pub amount: Decimal,
    pub platform: String,
    pub reference_number: String,
    pub status: TopUpStatus,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

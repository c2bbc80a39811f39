//! API request/response models for top-up requests.

use super::pagination::Pagination;
use crate::db::models::top_ups::{TopUpCreateDBRequest, TopUpDBResponse, TopUpStatus};
use crate::types::{TopUpId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TopUpCreate {
    #[schema(value_type = f64)]
    pub amount: Decimal,
    /// Payment platform the transfer was made on (e.g. "gcash")
    pub platform: String,
    /// Reference number of the transfer, checked by billing staff
    pub reference_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopUpResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: TopUpId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub platform: String,
    pub reference_number: String,
    pub status: TopUpStatus,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for listing top-ups
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListTopUpsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    pub status: Option<TopUpStatus>,
}

impl TopUpCreate {
    pub fn into_db_request(self, user_id: UserId) -> TopUpCreateDBRequest {
        TopUpCreateDBRequest {
            user_id,
            amount: self.amount,
            platform: self.platform,
            reference_number: self.reference_number,
        }
    }
}

impl From<TopUpDBResponse> for TopUpResponse {
    fn from(db: TopUpDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            amount: db.amount,
            platform: db.platform,
            reference_number: db.reference_number,
            status: db.status,
            reviewed_by: db.reviewed_by,
            reviewed_at: db.reviewed_at,
            created_at: db.created_at,
        }
    }
}

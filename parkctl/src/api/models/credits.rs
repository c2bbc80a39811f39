//! API request/response models for credit transactions.

use super::pagination::Pagination;
use crate::db::models::credits::{CreditTransactionDBResponse, CreditTransactionType, UserCreditBalanceDBResponse};
use crate::types::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Admin request to grant or remove credits
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreditTransactionCreate {
    pub transaction_type: CreditTransactionType,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreditTransactionResponse {
    pub id: i64,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub transaction_type: CreditTransactionType,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[schema(value_type = f64)]
    pub balance_after: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserBalanceResponse {
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    #[schema(value_type = f64)]
    pub current_balance: Decimal,
}

/// Query parameters for listing transactions
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListTransactionsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,
}

impl From<CreditTransactionDBResponse> for CreditTransactionResponse {
    fn from(db: CreditTransactionDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            transaction_type: db.transaction_type,
            amount: db.amount,
            balance_after: db.balance_after,
            description: db.description,
            created_at: db.created_at,
        }
    }
}

impl From<UserCreditBalanceDBResponse> for UserBalanceResponse {
    fn from(db: UserCreditBalanceDBResponse) -> Self {
        Self {
            user_id: db.user_id,
            current_balance: db.current_balance,
        }
    }
}

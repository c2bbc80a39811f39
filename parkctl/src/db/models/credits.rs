//! Database models for credit transactions.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Credit transaction type enum stored as TEXT in database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CreditTransactionType {
    TopUp,
    ReservationCharge,
    AdminGrant,
    AdminRemoval,
}

impl CreditTransactionType {
    /// Whether this transaction type reduces the balance
    pub fn is_debit(&self) -> bool {
        matches!(self, CreditTransactionType::ReservationCharge | CreditTransactionType::AdminRemoval)
    }
}

/// Database request for creating a new credit transaction
#[derive(Debug, Clone)]
pub struct CreditTransactionCreateDBRequest {
    pub user_id: UserId,
    pub transaction_type: CreditTransactionType,
    pub amount: Decimal,
    pub description: Option<String>,
}

impl CreditTransactionCreateDBRequest {
    /// Create an admin grant request
    pub fn admin_grant(user_id: UserId, grantor_id: UserId, amount: Decimal, description: Option<String>) -> Self {
        Self {
            user_id,
            transaction_type: CreditTransactionType::AdminGrant,
            amount,
            description: description.or_else(|| Some(format!("granted by {grantor_id}"))),
        }
    }
}

/// Database response for a credit transaction
#[derive(Debug, Clone)]
pub struct CreditTransactionDBResponse {
    pub id: i64,
    pub user_id: UserId,
    pub transaction_type: CreditTransactionType,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database response pairing a user with their current balance
#[derive(Debug, Clone)]
pub struct UserCreditBalanceDBResponse {
    pub user_id: UserId,
    pub current_balance: Decimal,
}

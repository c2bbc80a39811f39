//! Database repository for the credit ledger.
//!
//! The ledger is append-only: a user's balance is the `balance_after` of
//! their most recent transaction. All balance changes go through
//! [`Credits::create_transaction`], which computes the new balance inside a
//! transaction so concurrent writers cannot interleave.

use crate::db::{
    errors::{DbError, Result},
    models::credits::{
        CreditTransactionCreateDBRequest, CreditTransactionDBResponse, CreditTransactionType,
        UserCreditBalanceDBResponse,
    },
};
use crate::types::{abbrev_uuid, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Connection, FromRow, PgConnection};
use tracing::instrument;

// Database entity model for credit transaction
#[derive(Debug, Clone, FromRow)]
struct CreditTransaction {
    pub id: i64,
    pub user_id: UserId,
    pub transaction_type: CreditTransactionType,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CreditTransaction> for CreditTransactionDBResponse {
    fn from(tx: CreditTransaction) -> Self {
        Self {
            id: tx.id,
            user_id: tx.user_id,
            transaction_type: tx.transaction_type,
            amount: tx.amount,
            balance_after: tx.balance_after,
            description: tx.description,
            created_at: tx.created_at,
        }
    }
}

pub struct Credits<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Credits<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Append a transaction, deriving `balance_after` from the latest ledger
    /// row. Debits that would take the balance negative are refused.
    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id), amount = %request.amount), err)]
    pub async fn create_transaction(&mut self, request: &CreditTransactionCreateDBRequest) -> Result<CreditTransactionDBResponse> {
        let mut tx = self.db.begin().await?;

        let current_balance = Self::get_user_current_balance_internal(&mut tx, request.user_id).await?;

        let balance_after = if request.transaction_type.is_debit() {
            current_balance - request.amount
        } else {
            current_balance + request.amount
        };

        if balance_after < Decimal::ZERO {
            return Err(DbError::Other(anyhow::anyhow!(
                "Debit of {} would overdraw balance {}",
                request.amount,
                current_balance
            )));
        }

        let transaction = sqlx::query_as::<_, CreditTransaction>(
            r#"
            INSERT INTO credit_transactions (user_id, transaction_type, amount, balance_after, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.transaction_type)
        .bind(request.amount)
        .bind(balance_after)
        .bind(&request.description)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CreditTransactionDBResponse::from(transaction))
    }

    /// Get current balance for a user (latest balance_after from credit_transactions)
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn get_user_balance(&mut self, user_id: UserId) -> Result<Decimal> {
        let balance = Self::get_user_current_balance_internal(&mut *self.db, user_id).await?;
        Ok(balance)
    }

    /// Internal helper to get current balance within an existing transaction
    async fn get_user_current_balance_internal(tx: &mut PgConnection, user_id: UserId) -> Result<Decimal> {
        let balance = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT balance_after
            FROM credit_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(tx)
        .await?;

        Ok(balance.unwrap_or(Decimal::ZERO))
    }

    /// List transactions for a specific user with pagination, newest first
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn list_user_transactions(
        &mut self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<CreditTransactionDBResponse>> {
        let transactions = sqlx::query_as::<_, CreditTransaction>(
            r#"
            SELECT *
            FROM credit_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(transactions.into_iter().map(CreditTransactionDBResponse::from).collect())
    }

    /// List transactions across all users with pagination, newest first
    #[instrument(skip(self), err)]
    pub async fn list_all_transactions(&mut self, skip: i64, limit: i64) -> Result<Vec<CreditTransactionDBResponse>> {
        let transactions = sqlx::query_as::<_, CreditTransaction>(
            r#"
            SELECT *
            FROM credit_transactions
            ORDER BY created_at DESC, id DESC
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(transactions.into_iter().map(CreditTransactionDBResponse::from).collect())
    }

    /// Get all users with their current credit balances (billing view)
    #[instrument(skip(self), err)]
    pub async fn list_all_user_balances(&mut self) -> Result<Vec<UserCreditBalanceDBResponse>> {
        let balances = sqlx::query_as::<_, (UserId, Decimal)>(
            r#"
            SELECT DISTINCT ON (user_id) user_id, balance_after
            FROM credit_transactions
            ORDER BY user_id, created_at DESC, id DESC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(balances
            .into_iter()
            .map(|(user_id, current_balance)| UserCreditBalanceDBResponse {
                user_id,
                current_balance,
            })
            .collect())
    }
}

//! Database repository for top-up requests.
//!
//! Top-ups are submitted by users with a payment reference and reviewed by
//! billing staff. Approval marks the row credited and appends the matching
//! ledger credit in one transaction.

use crate::db::{
    errors::Result,
    handlers::Credits,
    models::credits::{CreditTransactionCreateDBRequest, CreditTransactionType},
    models::top_ups::{TopUpCreateDBRequest, TopUpDBResponse, TopUpStatus},
};
use crate::types::{abbrev_uuid, TopUpId, UserId};
use sqlx::{Connection, PgConnection};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing top-ups
#[derive(Debug, Clone, Default)]
pub struct TopUpFilter {
    pub user_id: Option<UserId>,
    pub status: Option<TopUpStatus>,
    pub skip: i64,
    pub limit: i64,
}

pub struct TopUps<'c> {
    db: &'c mut PgConnection,
}

impl<'c> TopUps<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id), amount = %request.amount), err)]
    pub async fn create(&mut self, request: &TopUpCreateDBRequest) -> Result<TopUpDBResponse> {
        let top_up = sqlx::query_as::<_, TopUpDBResponse>(
            r#"
            INSERT INTO top_ups (id, user_id, amount, platform, reference_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(request.amount)
        .bind(&request.platform)
        .bind(&request.reference_number)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(top_up)
    }

    #[instrument(skip(self), fields(top_up_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: TopUpId) -> Result<Option<TopUpDBResponse>> {
        let top_up = sqlx::query_as::<_, TopUpDBResponse>("SELECT * FROM top_ups WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(top_up)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn list(&mut self, filter: &TopUpFilter) -> Result<Vec<TopUpDBResponse>> {
        let top_ups = sqlx::query_as::<_, TopUpDBResponse>(
            r#"
            SELECT * FROM top_ups
            WHERE ($1::UUID IS NULL OR user_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.status)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(top_ups)
    }

    /// Approve a pending top-up: mark it credited and append the ledger
    /// credit, both or neither. Returns None when the row is missing or no
    /// longer pending, leaving the ledger untouched.
    #[instrument(skip(self), fields(top_up_id = %abbrev_uuid(&id), reviewer = %abbrev_uuid(&reviewer)), err)]
    pub async fn approve(&mut self, id: TopUpId, reviewer: UserId) -> Result<Option<TopUpDBResponse>> {
        let mut tx = self.db.begin().await?;

        let top_up = sqlx::query_as::<_, TopUpDBResponse>(
            r#"
            UPDATE top_ups
            SET status = 'credited', reviewed_by = $2, reviewed_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reviewer)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(top_up) = top_up else {
            return Ok(None);
        };

        let mut credits = Credits::new(&mut tx);
        credits
            .create_transaction(&CreditTransactionCreateDBRequest {
                user_id: top_up.user_id,
                transaction_type: CreditTransactionType::TopUp,
                amount: top_up.amount,
                description: Some(format!("top-up via {} ({})", top_up.platform, top_up.reference_number)),
            })
            .await?;

        tx.commit().await?;

        Ok(Some(top_up))
    }

    /// Reject a pending top-up. Returns None when the row is missing or no
    /// longer pending.
    #[instrument(skip(self), fields(top_up_id = %abbrev_uuid(&id), reviewer = %abbrev_uuid(&reviewer)), err)]
    pub async fn reject(&mut self, id: TopUpId, reviewer: UserId) -> Result<Option<TopUpDBResponse>> {
        let top_up = sqlx::query_as::<_, TopUpDBResponse>(
            r#"
            UPDATE top_ups
            SET status = 'rejected', reviewed_by = $2, reviewed_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reviewer)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(top_up)
    }
}

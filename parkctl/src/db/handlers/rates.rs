//! Database repository for rate schedules.
//!
//! Rate schedules are append-only history; the newest row is the schedule in
//! force. There is no update or delete.

use crate::db::{
    errors::Result,
    models::rates::{RateScheduleCreateDBRequest, RateScheduleDBResponse},
};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

pub struct Rates<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Rates<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(reservation_fee = %request.reservation_fee, per_minute_rate = %request.per_minute_rate), err)]
    pub async fn create(&mut self, request: &RateScheduleCreateDBRequest) -> Result<RateScheduleDBResponse> {
        let schedule = sqlx::query_as::<_, RateScheduleDBResponse>(
            r#"
            INSERT INTO rate_schedules (id, reservation_fee, per_minute_rate, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.reservation_fee)
        .bind(request.per_minute_rate)
        .bind(request.created_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(schedule)
    }

    /// The schedule currently in force, or None while the table is empty
    #[instrument(skip(self), err)]
    pub async fn current(&mut self) -> Result<Option<RateScheduleDBResponse>> {
        let schedule = sqlx::query_as::<_, RateScheduleDBResponse>(
            "SELECT * FROM rate_schedules ORDER BY created_at DESC LIMIT 1",
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(schedule)
    }

    /// Full schedule history, newest first
    #[instrument(skip(self), err)]
    pub async fn list(&mut self, skip: i64, limit: i64) -> Result<Vec<RateScheduleDBResponse>> {
        let schedules = sqlx::query_as::<_, RateScheduleDBResponse>(
            "SELECT * FROM rate_schedules ORDER BY created_at DESC OFFSET $1 LIMIT $2",
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(schedules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::get_system_user;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_current_is_none_while_empty(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Rates::new(&mut conn);
        assert!(repo.current().await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_newest_schedule_wins(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let system = get_system_user(&mut conn).await;

        let mut repo = Rates::new(&mut conn);
        repo.create(&RateScheduleCreateDBRequest {
            reservation_fee: Decimal::from(50),
            per_minute_rate: Decimal::from(2),
            created_by: system.id,
        })
        .await
        .unwrap();
        let newer = repo
            .create(&RateScheduleCreateDBRequest {
                reservation_fee: Decimal::from(60),
                per_minute_rate: Decimal::from(3),
                created_by: system.id,
            })
            .await
            .unwrap();

        let current = repo.current().await.unwrap().unwrap();
        assert_eq!(current.id, newer.id);
        assert_eq!(current.per_minute_rate, Decimal::from(3));

        let history = repo.list(0, 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, newer.id);
    }
}

//! Database repository for parking lots.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::lots::{LotCreateDBRequest, LotDBResponse, LotUpdateDBRequest},
};
use crate::types::{abbrev_uuid, LotId};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing lots
#[derive(Debug, Clone, Default)]
pub struct LotFilter {
    pub floor: Option<String>,
    pub area: Option<String>,
}

pub struct Lots<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Lots<'c> {
    type CreateRequest = LotCreateDBRequest;
    type UpdateRequest = LotUpdateDBRequest;
    type Response = LotDBResponse;
    type Id = LotId;
    type Filter = LotFilter;

    #[instrument(skip(self, request), fields(floor = %request.floor, area = %request.area, lot_number = request.lot_number), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let lot = sqlx::query_as::<_, LotDBResponse>(
            r#"
            INSERT INTO lots (id, floor, area, lot_number, available)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.floor)
        .bind(&request.area)
        .bind(request.lot_number)
        .bind(request.available)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(lot)
    }

    #[instrument(skip(self), fields(lot_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let lot = sqlx::query_as::<_, LotDBResponse>("SELECT * FROM lots WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(lot)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let lots = sqlx::query_as::<_, LotDBResponse>(
            r#"
            SELECT * FROM lots
            WHERE ($1::TEXT IS NULL OR floor = $1)
              AND ($2::TEXT IS NULL OR area = $2)
            ORDER BY floor, area, lot_number
            "#,
        )
        .bind(&filter.floor)
        .bind(&filter.area)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(lots)
    }

    #[instrument(skip(self), fields(lot_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lots WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(lot_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let lot = sqlx::query_as::<_, LotDBResponse>(
            r#"
            UPDATE lots SET
                floor = COALESCE($2, floor),
                area = COALESCE($3, area),
                lot_number = COALESCE($4, lot_number),
                available = COALESCE($5, available),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.floor)
        .bind(&request.area)
        .bind(request.lot_number)
        .bind(request.available)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(lot)
    }
}

impl<'c> Lots<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lots")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use sqlx::PgPool;

    fn lot(floor: &str, area: &str, number: i32) -> LotCreateDBRequest {
        LotCreateDBRequest {
            floor: floor.to_string(),
            area: area.to_string(),
            lot_number: number,
            available: true,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_lot(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Lots::new(&mut conn);

        let created = repo.create(&lot("2", "B", 7)).await.unwrap();
        assert_eq!(created.floor, "2");
        assert_eq!(created.area, "B");
        assert_eq!(created.lot_number, 7);
        assert!(created.available);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_identity_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Lots::new(&mut conn);

        repo.create(&lot("1", "A", 1)).await.unwrap();
        let err = repo.create(&lot("1", "A", 1)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // Same number on a different floor is a different lot
        repo.create(&lot("2", "A", 1)).await.unwrap();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_by_floor_and_area(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Lots::new(&mut conn);

        repo.create(&lot("1", "A", 1)).await.unwrap();
        repo.create(&lot("1", "B", 2)).await.unwrap();
        repo.create(&lot("2", "A", 3)).await.unwrap();

        let all = repo.list(&LotFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let floor1 = repo
            .list(&LotFilter {
                floor: Some("1".to_string()),
                area: None,
            })
            .await
            .unwrap();
        assert_eq!(floor1.len(), 2);

        let floor1_a = repo
            .list(&LotFilter {
                floor: Some("1".to_string()),
                area: Some("A".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(floor1_a.len(), 1);
        assert_eq!(floor1_a[0].lot_number, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_toggles_availability(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Lots::new(&mut conn);

        let created = repo.create(&lot("1", "A", 1)).await.unwrap();

        let updated = repo
            .update(
                created.id,
                &LotUpdateDBRequest {
                    available: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!updated.available);
        assert_eq!(updated.floor, "1");

        let missing = repo.update(Uuid::new_v4(), &LotUpdateDBRequest::default()).await;
        assert!(matches!(missing.unwrap_err(), DbError::NotFound));
    }
}

//! Database repository for reservations.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::reservations::{
        ReservationCreateDBRequest, ReservationDBResponse, ReservationUpdateDBRequest, ReservationsPerDayDBResponse,
    },
};
use crate::types::{abbrev_uuid, LotId, ReservationId, UserId};
use chrono::{DateTime, Duration, Utc};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing reservations
#[derive(Debug, Clone)]
pub struct ReservationFilter {
    pub lot_id: Option<LotId>,
    pub reserver: Option<UserId>,
    /// When false, early-ended rows are dropped from the listing
    pub include_early_ended: bool,
    pub skip: i64,
    pub limit: i64,
}

impl Default for ReservationFilter {
    fn default() -> Self {
        Self {
            lot_id: None,
            reserver: None,
            include_early_ended: true,
            skip: 0,
            limit: 100,
        }
    }
}

pub struct Reservations<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Reservations<'c> {
    type CreateRequest = ReservationCreateDBRequest;
    type UpdateRequest = ReservationUpdateDBRequest;
    type Response = ReservationDBResponse;
    type Id = ReservationId;
    type Filter = ReservationFilter;

    #[instrument(skip(self, request), fields(lot_id = %abbrev_uuid(&request.lot_id), reserver = %abbrev_uuid(&request.reserver)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let reservation = sqlx::query_as::<_, ReservationDBResponse>(
            r#"
            INSERT INTO reservations (id, lot_id, reserver, plate_number, starts_at, duration_minutes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.lot_id)
        .bind(request.reserver)
        .bind(&request.plate_number)
        .bind(request.starts_at)
        .bind(request.duration_minutes)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(reservation)
    }

    #[instrument(skip(self), fields(reservation_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let reservation = sqlx::query_as::<_, ReservationDBResponse>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(reservation)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let reservations = sqlx::query_as::<_, ReservationDBResponse>(
            r#"
            SELECT * FROM reservations
            WHERE ($1::UUID IS NULL OR lot_id = $1)
              AND ($2::UUID IS NULL OR reserver = $2)
              AND ($3 OR early_end = FALSE)
            ORDER BY starts_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.lot_id)
        .bind(filter.reserver)
        .bind(filter.include_early_ended)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(reservations)
    }

    #[instrument(skip(self), fields(reservation_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(reservation_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let reservation = sqlx::query_as::<_, ReservationDBResponse>(
            r#"
            UPDATE reservations SET
                early_end = COALESCE($2, early_end)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.early_end)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(reservation)
    }
}

impl<'c> Reservations<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Reservations that could still conflict with a candidate starting at
    /// `candidate_starts_at` on the given lot.
    ///
    /// Early-ended rows are excluded, and rows whose start predates
    /// `candidate_starts_at` by more than the maximum reservation length
    /// cannot reach the candidate, so the query prunes them with a cutoff
    /// on `starts_at` rather than computing every row's end. The cutoff is
    /// inclusive: a maximum-length row starting exactly at the cutoff ends
    /// exactly at the candidate's start, and shared instants conflict.
    #[instrument(skip(self), fields(lot_id = %abbrev_uuid(&lot_id)), err)]
    pub async fn potentially_conflicting(
        &mut self,
        lot_id: LotId,
        candidate_starts_at: DateTime<Utc>,
        max_reservation_minutes: i32,
    ) -> Result<Vec<ReservationDBResponse>> {
        let cutoff = candidate_starts_at - Duration::minutes(i64::from(max_reservation_minutes));

        let reservations = sqlx::query_as::<_, ReservationDBResponse>(
            r#"
            SELECT * FROM reservations
            WHERE lot_id = $1
              AND early_end = FALSE
              AND starts_at >= $2
            ORDER BY starts_at
            "#,
        )
        .bind(lot_id)
        .bind(cutoff)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(reservations)
    }

    /// Non-early-ended reservations whose interval has not ended by `at`.
    /// Feeds the availability board: rows covering `at` mean occupied,
    /// rows starting after `at` mean reserved.
    #[instrument(skip(self), err)]
    pub async fn active_on_or_after(&mut self, at: DateTime<Utc>) -> Result<Vec<ReservationDBResponse>> {
        let reservations = sqlx::query_as::<_, ReservationDBResponse>(
            r#"
            SELECT * FROM reservations
            WHERE early_end = FALSE
              AND starts_at + make_interval(mins => duration_minutes) >= $1
            ORDER BY starts_at
            "#,
        )
        .bind(at)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(reservations)
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservations")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    /// Daily creation counts over the trailing `days` window, oldest first.
    /// Days with no reservations are absent from the result.
    #[instrument(skip(self), err)]
    pub async fn created_per_day(&mut self, days: i32) -> Result<Vec<ReservationsPerDayDBResponse>> {
        let series = sqlx::query_as::<_, ReservationsPerDayDBResponse>(
            r#"
            SELECT created_at::date AS day, COUNT(*) AS count
            FROM reservations
            WHERE created_at >= NOW() - make_interval(days => $1)
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(days)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use crate::db::handlers::{Lots, Users};
    use crate::db::models::lots::LotCreateDBRequest;
    use crate::db::models::users::UserCreateDBRequest;
    use crate::api::models::users::{Role, UserCreate};
    use chrono::TimeZone;
    use sqlx::PgPool;

    async fn fixture(conn: &mut PgConnection) -> (UserId, LotId) {
        let user = Users::new(conn)
            .create(&UserCreateDBRequest::from(UserCreate {
                username: "driver".to_string(),
                email: "driver@example.com".to_string(),
                display_name: None,
                contact_number: None,
                plate_number: Some("XYZ-987".to_string()),
                roles: vec![Role::StandardUser],
            }))
            .await
            .unwrap();

        let lot = Lots::new(conn)
            .create(&LotCreateDBRequest {
                floor: "1".to_string(),
                area: "A".to_string(),
                lot_number: 1,
                available: true,
            })
            .await
            .unwrap();

        (user.id, lot.id)
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
    }

    fn request(lot_id: LotId, reserver: UserId, starts_at: DateTime<Utc>, duration_minutes: i32) -> ReservationCreateDBRequest {
        ReservationCreateDBRequest {
            lot_id,
            reserver,
            plate_number: "XYZ-987".to_string(),
            starts_at,
            duration_minutes,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (user_id, lot_id) = fixture(&mut conn).await;

        let mut repo = Reservations::new(&mut conn);
        let created = repo.create(&request(lot_id, user_id, at(9), 60)).await.unwrap();
        assert_eq!(created.duration_minutes, 60);
        assert!(!created.early_end);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.starts_at, at(9));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_zero_duration_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (user_id, lot_id) = fixture(&mut conn).await;

        let mut repo = Reservations::new(&mut conn);
        let err = repo.create(&request(lot_id, user_id, at(9), 0)).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_potentially_conflicting_applies_cutoff(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (user_id, lot_id) = fixture(&mut conn).await;

        let mut repo = Reservations::new(&mut conn);
        // Too old to reach a candidate at 12:00 with a 120 minute maximum
        repo.create(&request(lot_id, user_id, at(8), 60)).await.unwrap();
        // Inside the window
        let recent = repo.create(&request(lot_id, user_id, at(11), 60)).await.unwrap();
        // Early-ended rows free their interval
        let ended = repo.create(&request(lot_id, user_id, at(12), 60)).await.unwrap();
        repo.update(ended.id, &ReservationUpdateDBRequest { early_end: Some(true) })
            .await
            .unwrap();

        let candidates = repo.potentially_conflicting(lot_id, at(12), 120).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, recent.id);
    }

    // A maximum-length reservation ending exactly at the candidate's start
    // shares an instant with it, so the cutoff must keep it
    #[sqlx::test]
    #[test_log::test]
    async fn test_cutoff_keeps_max_length_row_ending_at_candidate_start(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (user_id, lot_id) = fixture(&mut conn).await;

        let mut repo = Reservations::new(&mut conn);
        let max = 1440;
        let held = repo
            .create(&request(lot_id, user_id, at(12) - Duration::minutes(i64::from(max)), max))
            .await
            .unwrap();

        let candidates = repo.potentially_conflicting(lot_id, at(12), max).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, held.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cutoff_is_scoped_to_the_lot(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (user_id, lot_id) = fixture(&mut conn).await;

        let other_lot = Lots::new(&mut conn)
            .create(&LotCreateDBRequest {
                floor: "1".to_string(),
                area: "A".to_string(),
                lot_number: 2,
                available: true,
            })
            .await
            .unwrap();

        let mut repo = Reservations::new(&mut conn);
        repo.create(&request(other_lot.id, user_id, at(12), 60)).await.unwrap();

        let candidates = repo.potentially_conflicting(lot_id, at(12), 120).await.unwrap();
        assert!(candidates.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_by_reserver(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (user_id, lot_id) = fixture(&mut conn).await;

        let mut repo = Reservations::new(&mut conn);
        repo.create(&request(lot_id, user_id, at(9), 60)).await.unwrap();
        repo.create(&request(lot_id, user_id, at(14), 30)).await.unwrap();

        let mine = repo
            .list(&ReservationFilter {
                reserver: Some(user_id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
        // Newest start first
        assert_eq!(mine[0].starts_at, at(14));

        let nobody = repo
            .list(&ReservationFilter {
                reserver: Some(Uuid::new_v4()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(nobody.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_active_on_or_after(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (user_id, lot_id) = fixture(&mut conn).await;

        let mut repo = Reservations::new(&mut conn);
        // Ended before the queried instant
        repo.create(&request(lot_id, user_id, at(6), 60)).await.unwrap();
        // Covers the queried instant
        let covering = repo.create(&request(lot_id, user_id, at(9), 120)).await.unwrap();
        // Starts after the queried instant
        let upcoming = repo.create(&request(lot_id, user_id, at(15), 60)).await.unwrap();

        let active = repo.active_on_or_after(at(10)).await.unwrap();
        let ids: Vec<_> = active.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![covering.id, upcoming.id]);
    }
}

use crate::{
    api::models::dashboard::{DashboardOverviewResponse, OccupancyBreakdown, ReservationsPerDay},
    auth::permissions::{operation, resource, RequiresPermission},
    db::handlers::{lots::LotFilter, Lots, Repository, Reservations, Users},
    errors::{Error, Result},
    AppState,
};
use axum::{extract::State, response::Json};
use chrono::Utc;

/// Number of trailing days covered by the reservations-per-day series.
const TREND_DAYS: i32 = 30;

/// Dashboard overview: totals, live occupancy and the booking trend
#[utoipa::path(
    get,
    path = "/dashboard/overview",
    tag = "dashboard",
    summary = "Dashboard overview",
    responses(
        (status = 200, description = "Totals, occupancy breakdown and reservations per day", body = DashboardOverviewResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn dashboard_overview(
    State(state): State<AppState>,
    _perm: RequiresPermission<resource::Dashboard, operation::ReadAll>,
) -> Result<Json<DashboardOverviewResponse>> {
    let now = Utc::now();

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let total_users = Users::new(&mut pool_conn).count().await?;
    let total_lots = Lots::new(&mut pool_conn).count().await?;
    let total_reservations = Reservations::new(&mut pool_conn).count().await?;

    let lots = Lots::new(&mut pool_conn).list(&LotFilter::default()).await?;
    let active = Reservations::new(&mut pool_conn).active_on_or_after(now).await?;

    let mut occupancy = OccupancyBreakdown {
        occupied: 0,
        reserved: 0,
        available: 0,
        unavailable: 0,
    };
    for lot in &lots {
        if !lot.available {
            occupancy.unavailable += 1;
        } else if active.iter().any(|r| r.lot_id == lot.id && r.span().contains(now)) {
            occupancy.occupied += 1;
        } else if active.iter().any(|r| r.lot_id == lot.id && r.starts_at > now) {
            occupancy.reserved += 1;
        } else {
            occupancy.available += 1;
        }
    }

    let reservations_per_day = Reservations::new(&mut pool_conn)
        .created_per_day(TREND_DAYS)
        .await?
        .into_iter()
        .map(|row| ReservationsPerDay {
            day: row.day,
            count: row.count,
        })
        .collect();

    Ok(Json(DashboardOverviewResponse {
        total_users,
        total_lots,
        total_reservations,
        occupancy,
        reservations_per_day,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::{
        handlers::Credits,
        models::credits::{CreditTransactionCreateDBRequest, CreditTransactionType},
    };
    use crate::test_utils::{add_auth_headers, create_test_app, create_test_lot, create_test_user};
    use chrono::Duration;
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_overview_counts_and_occupancy(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let manager = create_test_user(&pool, Role::LotManager).await;
        let user = create_test_user(&pool, Role::StandardUser).await;

        let booked_lot = create_test_lot(&pool, "1", "A", 1).await;
        let _free_lot = create_test_lot(&pool, "1", "A", 2).await;

        {
            let mut conn = pool.acquire().await.unwrap();
            Credits::new(&mut conn)
                .create_transaction(&CreditTransactionCreateDBRequest {
                    user_id: user.id,
                    transaction_type: CreditTransactionType::AdminGrant,
                    amount: Decimal::from(1000),
                    description: None,
                })
                .await
                .unwrap();
        }

        // A reservation starting in an hour leaves the lot reserved now
        app.post("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .json(&json!({
                "lot_id": booked_lot.id,
                "starts_at": Utc::now() + Duration::hours(1),
                "duration_minutes": 60
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = app
            .get("/admin/api/v1/dashboard/overview")
            .add_header(add_auth_headers(&manager).0, add_auth_headers(&manager).1)
            .await;

        response.assert_status_ok();
        let overview: DashboardOverviewResponse = response.json();
        assert_eq!(overview.total_lots, 2);
        assert_eq!(overview.total_reservations, 1);
        assert!(overview.total_users >= 2);
        assert_eq!(overview.occupancy.reserved, 1);
        assert_eq!(overview.occupancy.available, 1);
        assert_eq!(overview.reservations_per_day.len(), 1);
        assert_eq!(overview.reservations_per_day[0].count, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_standard_user_cannot_read_dashboard(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;

        let response = app
            .get("/admin/api/v1/dashboard/overview")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .await;

        response.assert_status_forbidden();
    }
}

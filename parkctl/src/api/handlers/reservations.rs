use crate::{
    api::models::reservations::{
        ListReservationsQuery, ReservationCreate, ReservationCreatedResponse, ReservationResponse,
    },
    auth::permissions::{operation, resource, user_can, RequiresPermission},
    booking::{
        conflict::{is_lot_available, ReservationSpan},
        pricing::{reservation_amount, RateCard},
    },
    db::{
        handlers::{reservations::ReservationFilter, Credits, Lots, Rates, Repository, Reservations, Users},
        models::{
            credits::{CreditTransactionCreateDBRequest, CreditTransactionType},
            reservations::{ReservationCreateDBRequest, ReservationUpdateDBRequest},
        },
    },
    errors::{Error, Result},
    types::{LotId, Operation, Resource, ReservationId},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

/// Advisory lock key for a lot, so concurrent bookings of the same lot
/// serialize while bookings of different lots proceed in parallel
fn lot_lock_key(lot_id: LotId) -> i64 {
    let b = lot_id.as_bytes();
    i64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

/// Book a reservation.
///
/// Runs the whole booking as one transaction under a per-lot advisory
/// lock: conflict check, pricing, balance check, the reservation insert
/// and the ledger debit all commit or roll back together.
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    summary = "Book a reservation",
    request_body = ReservationCreate,
    responses(
        (status = 201, description = "Reservation booked", body = ReservationCreatedResponse),
        (status = 400, description = "Invalid duration or no plate number"),
        (status = 401, description = "Unauthorized"),
        (status = 402, description = "Insufficient credits"),
        (status = 404, description = "Lot not found"),
        (status = 409, description = "Lot unavailable or interval conflicts"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip(state, perm, data), fields(user_id = %perm.user.id, lot_id = %data.lot_id))]
pub async fn create_reservation(
    State(state): State<AppState>,
    perm: RequiresPermission<resource::Reservations, operation::CreateOwn>,
    Json(data): Json<ReservationCreate>,
) -> Result<(StatusCode, Json<ReservationCreatedResponse>)> {
    let max_minutes = state.config.booking.max_reservation_minutes;

    if data.duration_minutes <= 0 {
        return Err(Error::BadRequest {
            message: "Reservation duration must be positive".to_string(),
        });
    }
    if data.duration_minutes > max_minutes {
        return Err(Error::BadRequest {
            message: format!("Reservation duration cannot exceed {max_minutes} minutes"),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    // Held until commit; other bookings for this lot queue behind it
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(lot_lock_key(data.lot_id))
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.into()))?;

    let lot = Lots::new(&mut tx).get_by_id(data.lot_id).await?.ok_or(Error::NotFound {
        resource: "lot".to_string(),
        id: data.lot_id.to_string(),
    })?;

    if !lot.available {
        return Err(Error::LotUnavailable {
            message: "This lot is not open for booking".to_string(),
        });
    }

    let existing = Reservations::new(&mut tx)
        .potentially_conflicting(data.lot_id, data.starts_at, max_minutes)
        .await?;
    let held: Vec<ReservationSpan> = existing.iter().map(|r| r.span()).collect();
    let candidate = ReservationSpan::new(data.starts_at, data.duration_minutes);

    if !is_lot_available(&held, &candidate) {
        return Err(Error::LotUnavailable {
            message: "This lot is already reserved for the requested time".to_string(),
        });
    }

    // Plate number falls back to the reserver's profile
    let reserver = Users::new(&mut tx).get_by_id(perm.user.id).await?.ok_or(Error::Unauthenticated {
        message: Some("User not found".to_string()),
    })?;
    let plate_number = data
        .plate_number
        .or(reserver.plate_number)
        .ok_or_else(|| Error::BadRequest {
            message: "No plate number provided and none on your profile".to_string(),
        })?;

    let rates = match Rates::new(&mut tx).current().await? {
        Some(schedule) => RateCard::from(&schedule),
        None => state.config.booking.default_rate_card(),
    };
    let amount = reservation_amount(data.duration_minutes, &rates);

    let balance = Credits::new(&mut tx).get_user_balance(perm.user.id).await?;
    if balance < amount {
        return Err(Error::InsufficientCredits {
            required: amount,
            balance,
        });
    }

    let created = Reservations::new(&mut tx)
        .create(&ReservationCreateDBRequest {
            lot_id: data.lot_id,
            reserver: perm.user.id,
            plate_number,
            starts_at: data.starts_at,
            duration_minutes: data.duration_minutes,
        })
        .await?;

    Credits::new(&mut tx)
        .create_transaction(&CreditTransactionCreateDBRequest {
            user_id: perm.user.id,
            transaction_type: CreditTransactionType::ReservationCharge,
            amount,
            description: Some(format!("Reservation for lot {}-{}-{}", lot.floor, lot.area, lot.lot_number)),
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationCreatedResponse {
            reservation: ReservationResponse::from(created),
            amount_charged: amount,
        }),
    ))
}

/// List all reservations
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    summary = "List all reservations",
    params(
        ListReservationsQuery
    ),
    responses(
        (status = 200, description = "List of reservations", body = [ReservationResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<ListReservationsQuery>,
    _perm: RequiresPermission<resource::Reservations, operation::ReadAll>,
) -> Result<Json<Vec<ReservationResponse>>> {
    let (skip, limit) = query.pagination.params();

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Reservations::new(&mut pool_conn);

    let reservations = repo
        .list(&ReservationFilter {
            lot_id: query.lot_id,
            reserver: None,
            include_early_ended: query.include_early_ended.unwrap_or(true),
            skip,
            limit,
        })
        .await?;

    Ok(Json(reservations.into_iter().map(ReservationResponse::from).collect()))
}

/// List the current user's reservations
#[utoipa::path(
    get,
    path = "/users/current/reservations",
    tag = "reservations",
    summary = "List current user's reservations",
    params(
        ListReservationsQuery
    ),
    responses(
        (status = 200, description = "List of reservations", body = [ReservationResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_current_user_reservations(
    State(state): State<AppState>,
    Query(query): Query<ListReservationsQuery>,
    perm: RequiresPermission<resource::Reservations, operation::ReadOwn>,
) -> Result<Json<Vec<ReservationResponse>>> {
    let (skip, limit) = query.pagination.params();

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Reservations::new(&mut pool_conn);

    let reservations = repo
        .list(&ReservationFilter {
            lot_id: query.lot_id,
            reserver: Some(perm.user.id),
            include_early_ended: query.include_early_ended.unwrap_or(true),
            skip,
            limit,
        })
        .await?;

    Ok(Json(reservations.into_iter().map(ReservationResponse::from).collect()))
}

/// Get a reservation by ID
#[utoipa::path(
    get,
    path = "/reservations/{reservation_id}",
    tag = "reservations",
    summary = "Get reservation by ID",
    params(
        ("reservation_id" = String, Path, description = "Reservation ID (UUID)"),
    ),
    responses(
        (status = 200, description = "Reservation", body = ReservationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Reservation not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn get_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<ReservationId>,
    perm: RequiresPermission<resource::Reservations, operation::ReadOwn>,
) -> Result<Json<ReservationResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Reservations::new(&mut pool_conn);

    let reservation = repo.get_by_id(reservation_id).await?.ok_or(Error::NotFound {
        resource: "reservation".to_string(),
        id: reservation_id.to_string(),
    })?;

    // Reading someone else's reservation needs the all-reservations grant
    if reservation.reserver != perm.user.id && !user_can(&perm.user, Resource::Reservations, Operation::ReadAll) {
        return Err(Error::NotFound {
            resource: "reservation".to_string(),
            id: reservation_id.to_string(),
        });
    }

    Ok(Json(ReservationResponse::from(reservation)))
}

/// End a reservation early, freeing the whole interval for rebooking.
///
/// A staff operation: reservers cannot cut their own reservations short.
#[utoipa::path(
    post,
    path = "/reservations/{reservation_id}/early-end",
    tag = "reservations",
    summary = "End a reservation early",
    description = "Marks the reservation as early-ended. The whole interval is freed and no longer blocks new bookings. No refund is issued.",
    params(
        ("reservation_id" = String, Path, description = "Reservation ID (UUID)"),
    ),
    responses(
        (status = 200, description = "Reservation ended", body = ReservationResponse),
        (status = 400, description = "Reservation already ended"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Reservation not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn early_end_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<ReservationId>,
    _perm: RequiresPermission<resource::Reservations, operation::UpdateAll>,
) -> Result<Json<ReservationResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Reservations::new(&mut pool_conn);

    let reservation = repo.get_by_id(reservation_id).await?.ok_or(Error::NotFound {
        resource: "reservation".to_string(),
        id: reservation_id.to_string(),
    })?;

    if reservation.early_end {
        return Err(Error::BadRequest {
            message: "Reservation has already been ended early".to_string(),
        });
    }

    let updated = repo
        .update(reservation_id, &ReservationUpdateDBRequest { early_end: Some(true) })
        .await?;

    Ok(Json(ReservationResponse::from(updated)))
}

/// Delete a reservation
#[utoipa::path(
    delete,
    path = "/reservations/{reservation_id}",
    tag = "reservations",
    summary = "Delete reservation",
    params(
        ("reservation_id" = String, Path, description = "Reservation ID (UUID)"),
    ),
    responses(
        (status = 204, description = "Reservation deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Reservation not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn delete_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<ReservationId>,
    _perm: RequiresPermission<resource::Reservations, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Reservations::new(&mut pool_conn);

    if !repo.delete(reservation_id).await? {
        return Err(Error::NotFound {
            resource: "reservation".to_string(),
            id: reservation_id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::{Role, UserResponse};
    use crate::test_utils::{add_auth_headers, create_test_app, create_test_lot, create_test_user};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;

    async fn grant_credits(pool: &PgPool, user: &UserResponse, amount: i64) {
        let mut conn = pool.acquire().await.unwrap();
        Credits::new(&mut conn)
            .create_transaction(&CreditTransactionCreateDBRequest {
                user_id: user.id,
                transaction_type: CreditTransactionType::AdminGrant,
                amount: Decimal::from(amount),
                description: None,
            })
            .await
            .unwrap();
    }

    fn tomorrow_at(hour: u32) -> DateTime<Utc> {
        let tomorrow = (Utc::now() + Duration::days(1)).date_naive();
        Utc.from_utc_datetime(&tomorrow.and_hms_opt(hour, 0, 0).unwrap())
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_booking_charges_the_ledger(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;
        let lot = create_test_lot(&pool, "1", "A", 1).await;
        grant_credits(&pool, &user, 500).await;

        let response = app
            .post("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .json(&json!({
                "lot_id": lot.id,
                "starts_at": tomorrow_at(9),
                "duration_minutes": 60
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created: ReservationCreatedResponse = response.json();
        // Default rates: 50 fee + 60 * 2 per minute
        assert_eq!(created.amount_charged, Decimal::from(170));
        assert_eq!(created.reservation.reserver, user.id);

        let mut conn = pool.acquire().await.unwrap();
        let balance = Credits::new(&mut conn).get_user_balance(user.id).await.unwrap();
        assert_eq!(balance, Decimal::from(330));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_booking_with_insufficient_credits_is_rejected(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;
        let lot = create_test_lot(&pool, "1", "A", 1).await;
        grant_credits(&pool, &user, 10).await;

        let response = app
            .post("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .json(&json!({
                "lot_id": lot.id,
                "starts_at": tomorrow_at(9),
                "duration_minutes": 60
            }))
            .await;

        response.assert_status(StatusCode::PAYMENT_REQUIRED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "INSUFFICIENT_CREDITS");

        // Nothing was charged
        let mut conn = pool.acquire().await.unwrap();
        let balance = Credits::new(&mut conn).get_user_balance(user.id).await.unwrap();
        assert_eq!(balance, Decimal::from(10));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_conflicting_interval_is_rejected(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;
        let other = create_test_user(&pool, Role::StandardUser).await;
        let lot = create_test_lot(&pool, "1", "A", 1).await;
        grant_credits(&pool, &user, 1000).await;
        grant_credits(&pool, &other, 1000).await;

        app.post("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .json(&json!({
                "lot_id": lot.id,
                "starts_at": tomorrow_at(9),
                "duration_minutes": 120
            }))
            .await
            .assert_status(StatusCode::CREATED);

        // Starts inside the held interval
        let response = app
            .post("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&other).0, add_auth_headers(&other).1)
            .json(&json!({
                "lot_id": lot.id,
                "starts_at": tomorrow_at(10),
                "duration_minutes": 60
            }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "LOT_UNAVAILABLE");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unavailable_lot_rejects_bookings(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;
        let manager = create_test_user(&pool, Role::LotManager).await;
        let lot = create_test_lot(&pool, "1", "A", 1).await;
        grant_credits(&pool, &user, 1000).await;

        app.patch(&format!("/admin/api/v1/lots/{}", lot.id))
            .add_header(add_auth_headers(&manager).0, add_auth_headers(&manager).1)
            .json(&json!({"available": false}))
            .await
            .assert_status_ok();

        let response = app
            .post("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .json(&json!({
                "lot_id": lot.id,
                "starts_at": tomorrow_at(9),
                "duration_minutes": 60
            }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_early_end_frees_the_interval(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;
        let other = create_test_user(&pool, Role::StandardUser).await;
        let manager = create_test_user(&pool, Role::LotManager).await;
        let lot = create_test_lot(&pool, "1", "A", 1).await;
        grant_credits(&pool, &user, 1000).await;
        grant_credits(&pool, &other, 1000).await;

        let response = app
            .post("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .json(&json!({
                "lot_id": lot.id,
                "starts_at": tomorrow_at(9),
                "duration_minutes": 120
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: ReservationCreatedResponse = response.json();

        app.post(&format!("/admin/api/v1/reservations/{}/early-end", created.reservation.id))
            .add_header(add_auth_headers(&manager).0, add_auth_headers(&manager).1)
            .await
            .assert_status_ok();

        // The freed interval can now be rebooked
        let response = app
            .post("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&other).0, add_auth_headers(&other).1)
            .json(&json!({
                "lot_id": lot.id,
                "starts_at": tomorrow_at(10),
                "duration_minutes": 60
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_early_end_twice_is_rejected(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;
        let manager = create_test_user(&pool, Role::LotManager).await;
        let lot = create_test_lot(&pool, "1", "A", 1).await;
        grant_credits(&pool, &user, 1000).await;

        let response = app
            .post("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .json(&json!({
                "lot_id": lot.id,
                "starts_at": tomorrow_at(9),
                "duration_minutes": 60
            }))
            .await;
        let created: ReservationCreatedResponse = response.json();

        app.post(&format!("/admin/api/v1/reservations/{}/early-end", created.reservation.id))
            .add_header(add_auth_headers(&manager).0, add_auth_headers(&manager).1)
            .await
            .assert_status_ok();

        app.post(&format!("/admin/api/v1/reservations/{}/early-end", created.reservation.id))
            .add_header(add_auth_headers(&manager).0, add_auth_headers(&manager).1)
            .await
            .assert_status_bad_request();
    }

    // Early end is a staff operation; the reserver cannot perform it even
    // on their own reservation
    #[sqlx::test]
    #[test_log::test]
    async fn test_reserver_cannot_early_end_own_reservation(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;
        let lot = create_test_lot(&pool, "1", "A", 1).await;
        grant_credits(&pool, &user, 1000).await;

        let response = app
            .post("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .json(&json!({
                "lot_id": lot.id,
                "starts_at": tomorrow_at(9),
                "duration_minutes": 60
            }))
            .await;
        let created: ReservationCreatedResponse = response.json();

        app.post(&format!("/admin/api/v1/reservations/{}/early-end", created.reservation.id))
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .await
            .assert_status_forbidden();

        // The reservation is untouched
        let mut conn = pool.acquire().await.unwrap();
        let row = Reservations::new(&mut conn).get_by_id(created.reservation.id).await.unwrap().unwrap();
        assert!(!row.early_end);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_plate_falls_back_to_profile(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;
        let lot = create_test_lot(&pool, "1", "A", 1).await;
        grant_credits(&pool, &user, 1000).await;

        let response = app
            .post("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .json(&json!({
                "lot_id": lot.id,
                "starts_at": tomorrow_at(9),
                "duration_minutes": 30
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created: ReservationCreatedResponse = response.json();
        assert_eq!(Some(created.reservation.plate_number), user.plate_number);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duration_over_maximum_is_rejected(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;
        let lot = create_test_lot(&pool, "1", "A", 1).await;
        grant_credits(&pool, &user, 100_000).await;

        let response = app
            .post("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .json(&json!({
                "lot_id": lot.id,
                "starts_at": tomorrow_at(9),
                "duration_minutes": 24 * 60 + 1
            }))
            .await;

        response.assert_status_bad_request();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_own_listing_is_scoped(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;
        let other = create_test_user(&pool, Role::StandardUser).await;
        let lot = create_test_lot(&pool, "1", "A", 1).await;
        grant_credits(&pool, &user, 1000).await;
        grant_credits(&pool, &other, 1000).await;

        app.post("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .json(&json!({"lot_id": lot.id, "starts_at": tomorrow_at(9), "duration_minutes": 30}))
            .await
            .assert_status(StatusCode::CREATED);
        app.post("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&other).0, add_auth_headers(&other).1)
            .json(&json!({"lot_id": lot.id, "starts_at": tomorrow_at(12), "duration_minutes": 30}))
            .await
            .assert_status(StatusCode::CREATED);

        let response = app
            .get("/admin/api/v1/users/current/reservations")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .await;

        response.assert_status_ok();
        let mine: Vec<ReservationResponse> = response.json();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].reserver, user.id);

        // The full book requires the all-reservations grant
        app.get("/admin/api/v1/reservations")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .await
            .assert_status_forbidden();
    }
}

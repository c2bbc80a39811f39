use crate::{
    api::models::{
        pagination::Pagination,
        rates::{RateScheduleCreate, RateScheduleResponse},
    },
    auth::permissions::{operation, resource, RequiresPermission},
    db::{handlers::Rates, models::rates::RateScheduleCreateDBRequest},
    errors::{Error, Result},
    AppState,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;

/// Get the rate schedule currently in force.
///
/// Falls back to the configured defaults while no schedule has been
/// created; the fallback carries no id or author.
#[utoipa::path(
    get,
    path = "/rates/current",
    tag = "rates",
    summary = "Get current rates",
    responses(
        (status = 200, description = "Rate schedule in force", body = RateScheduleResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn get_current_rates(
    State(state): State<AppState>,
    _perm: RequiresPermission<resource::Rates, operation::ReadOwn>,
) -> Result<Json<RateScheduleResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let response = match Rates::new(&mut pool_conn).current().await? {
        Some(schedule) => RateScheduleResponse::from(schedule),
        None => RateScheduleResponse::from_defaults(state.config.booking.default_rate_card()),
    };

    Ok(Json(response))
}

/// List the rate schedule history, newest first
#[utoipa::path(
    get,
    path = "/rates",
    tag = "rates",
    summary = "List rate schedule history",
    params(
        Pagination
    ),
    responses(
        (status = 200, description = "Schedule history, newest first", body = [RateScheduleResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_rates(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    _perm: RequiresPermission<resource::Rates, operation::ReadOwn>,
) -> Result<Json<Vec<RateScheduleResponse>>> {
    let (skip, limit) = pagination.params();

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let schedules = Rates::new(&mut pool_conn).list(skip, limit).await?;

    Ok(Json(schedules.into_iter().map(RateScheduleResponse::from).collect()))
}

/// Create a new rate schedule, superseding the current one
#[utoipa::path(
    post,
    path = "/rates",
    tag = "rates",
    summary = "Create rate schedule",
    description = "Appends a new schedule to the history. Existing reservations keep the price they were charged; only new bookings use the new rates.",
    request_body = RateScheduleCreate,
    responses(
        (status = 201, description = "Schedule created", body = RateScheduleResponse),
        (status = 400, description = "Negative fee or rate"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip(state, perm, data), fields(created_by = %perm.user.id))]
pub async fn create_rate_schedule(
    State(state): State<AppState>,
    perm: RequiresPermission<resource::Rates, operation::CreateAll>,
    Json(data): Json<RateScheduleCreate>,
) -> Result<(StatusCode, Json<RateScheduleResponse>)> {
    if data.reservation_fee < Decimal::ZERO || data.per_minute_rate < Decimal::ZERO {
        return Err(Error::BadRequest {
            message: "Rates cannot be negative".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Rates::new(&mut pool_conn)
        .create(&RateScheduleCreateDBRequest {
            reservation_fee: data.reservation_fee,
            per_minute_rate: data.per_minute_rate,
            created_by: perm.user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RateScheduleResponse::from(created))))
}

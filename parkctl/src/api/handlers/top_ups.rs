use crate::{
    api::models::top_ups::{ListTopUpsQuery, TopUpCreate, TopUpResponse},
    auth::permissions::{operation, resource, RequiresPermission},
    db::handlers::{top_ups::TopUpFilter, TopUps},
    errors::{Error, Result},
    types::TopUpId,
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;

/// Submit a top-up request
#[utoipa::path(
    post,
    path = "/top-ups",
    tag = "top-ups",
    summary = "Submit a top-up request",
    description = "Records a payment transfer for billing staff to review. Credits land on the balance only once the request is approved.",
    request_body = TopUpCreate,
    responses(
        (status = 201, description = "Top-up submitted", body = TopUpResponse),
        (status = 400, description = "Non-positive amount"),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn create_top_up(
    State(state): State<AppState>,
    perm: RequiresPermission<resource::TopUps, operation::CreateOwn>,
    Json(data): Json<TopUpCreate>,
) -> Result<(StatusCode, Json<TopUpResponse>)> {
    if data.amount <= Decimal::ZERO {
        return Err(Error::BadRequest {
            message: "Top-up amount must be positive".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = TopUps::new(&mut pool_conn)
        .create(&data.into_db_request(perm.user.id))
        .await?;

    Ok((StatusCode::CREATED, Json(TopUpResponse::from(created))))
}

/// List the current user's top-up requests
#[utoipa::path(
    get,
    path = "/users/current/top-ups",
    tag = "top-ups",
    summary = "List current user's top-ups",
    params(
        ListTopUpsQuery
    ),
    responses(
        (status = 200, description = "Top-up requests, newest first", body = [TopUpResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_current_user_top_ups(
    State(state): State<AppState>,
    Query(query): Query<ListTopUpsQuery>,
    perm: RequiresPermission<resource::TopUps, operation::ReadOwn>,
) -> Result<Json<Vec<TopUpResponse>>> {
    let (skip, limit) = query.pagination.params();

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let top_ups = TopUps::new(&mut pool_conn)
        .list(&TopUpFilter {
            user_id: Some(perm.user.id),
            status: query.status,
            skip,
            limit,
        })
        .await?;

    Ok(Json(top_ups.into_iter().map(TopUpResponse::from).collect()))
}

/// List all top-up requests
#[utoipa::path(
    get,
    path = "/top-ups",
    tag = "top-ups",
    summary = "List all top-ups",
    params(
        ListTopUpsQuery
    ),
    responses(
        (status = 200, description = "Top-up requests, newest first", body = [TopUpResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_top_ups(
    State(state): State<AppState>,
    Query(query): Query<ListTopUpsQuery>,
    _perm: RequiresPermission<resource::TopUps, operation::ReadAll>,
) -> Result<Json<Vec<TopUpResponse>>> {
    let (skip, limit) = query.pagination.params();

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let top_ups = TopUps::new(&mut pool_conn)
        .list(&TopUpFilter {
            user_id: None,
            status: query.status,
            skip,
            limit,
        })
        .await?;

    Ok(Json(top_ups.into_iter().map(TopUpResponse::from).collect()))
}

/// Approve a pending top-up
#[utoipa::path(
    post,
    path = "/top-ups/{top_up_id}/approve",
    tag = "top-ups",
    summary = "Approve a top-up",
    description = "Marks the request credited and appends the matching ledger credit in one transaction. Only pending requests can be approved.",
    params(
        ("top_up_id" = String, Path, description = "Top-up ID (UUID)"),
    ),
    responses(
        (status = 200, description = "Top-up approved and credited", body = TopUpResponse),
        (status = 400, description = "Top-up is not pending"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Top-up not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip(state, perm), fields(reviewer = %perm.user.id, top_up_id = %top_up_id))]
pub async fn approve_top_up(
    State(state): State<AppState>,
    Path(top_up_id): Path<TopUpId>,
    perm: RequiresPermission<resource::TopUps, operation::UpdateAll>,
) -> Result<Json<TopUpResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = TopUps::new(&mut pool_conn);

    match repo.approve(top_up_id, perm.user.id).await? {
        Some(approved) => Ok(Json(TopUpResponse::from(approved))),
        None => match repo.get_by_id(top_up_id).await? {
            Some(_) => Err(Error::BadRequest {
                message: "Top-up has already been reviewed".to_string(),
            }),
            None => Err(Error::NotFound {
                resource: "top-up".to_string(),
                id: top_up_id.to_string(),
            }),
        },
    }
}

/// Reject a pending top-up
#[utoipa::path(
    post,
    path = "/top-ups/{top_up_id}/reject",
    tag = "top-ups",
    summary = "Reject a top-up",
    params(
        ("top_up_id" = String, Path, description = "Top-up ID (UUID)"),
    ),
    responses(
        (status = 200, description = "Top-up rejected", body = TopUpResponse),
        (status = 400, description = "Top-up is not pending"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Top-up not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip(state, perm), fields(reviewer = %perm.user.id, top_up_id = %top_up_id))]
pub async fn reject_top_up(
    State(state): State<AppState>,
    Path(top_up_id): Path<TopUpId>,
    perm: RequiresPermission<resource::TopUps, operation::UpdateAll>,
) -> Result<Json<TopUpResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = TopUps::new(&mut pool_conn);

    match repo.reject(top_up_id, perm.user.id).await? {
        Some(rejected) => Ok(Json(TopUpResponse::from(rejected))),
        None => match repo.get_by_id(top_up_id).await? {
            Some(_) => Err(Error::BadRequest {
                message: "Top-up has already been reviewed".to_string(),
            }),
            None => Err(Error::NotFound {
                resource: "top-up".to_string(),
                id: top_up_id.to_string(),
            }),
        },
    }
}

use crate::{
    api::models::lots::{AvailabilityQuery, ListLotsQuery, LotAvailabilityResponse, LotCreate, LotResponse, LotStatus, LotUpdate},
    auth::permissions::{operation, resource, RequiresPermission},
    db::handlers::{lots::LotFilter, Lots, Repository, Reservations},
    errors::{Error, Result},
    types::LotId,
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;

/// List parking lots
#[utoipa::path(
    get,
    path = "/lots",
    tag = "lots",
    summary = "List parking lots",
    params(
        ListLotsQuery
    ),
    responses(
        (status = 200, description = "List of lots", body = [LotResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_lots(
    State(state): State<AppState>,
    Query(query): Query<ListLotsQuery>,
    _perm: RequiresPermission<resource::Lots, operation::ReadOwn>,
) -> Result<Json<Vec<LotResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Lots::new(&mut pool_conn);

    let lots = repo
        .list(&LotFilter {
            floor: query.floor,
            area: query.area,
        })
        .await?;

    Ok(Json(lots.into_iter().map(LotResponse::from).collect()))
}

/// The availability board: every lot with its booking status at an instant
#[utoipa::path(
    get,
    path = "/lots/availability",
    tag = "lots",
    summary = "Lot availability board",
    description = "Every lot with its status (unavailable, occupied, reserved, or available) at the given instant",
    params(
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Availability board", body = [LotAvailabilityResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn lot_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
    _perm: RequiresPermission<resource::Lots, operation::ReadOwn>,
) -> Result<Json<Vec<LotAvailabilityResponse>>> {
    let at = query.at.unwrap_or_else(Utc::now);

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let lots = Lots::new(&mut pool_conn).list(&LotFilter::default()).await?;
    let active = Reservations::new(&mut pool_conn).active_on_or_after(at).await?;

    let board = lots
        .into_iter()
        .map(|lot| {
            let status = if !lot.available {
                LotStatus::Unavailable
            } else if active.iter().any(|r| r.lot_id == lot.id && r.span().contains(at)) {
                LotStatus::Occupied
            } else if active.iter().any(|r| r.lot_id == lot.id && r.starts_at > at) {
                LotStatus::Reserved
            } else {
                LotStatus::Available
            };

            LotAvailabilityResponse {
                lot: LotResponse::from(lot),
                status,
            }
        })
        .collect();

    Ok(Json(board))
}

/// Create a parking lot
#[utoipa::path(
    post,
    path = "/lots",
    tag = "lots",
    summary = "Create a parking lot",
    request_body = LotCreate,
    responses(
        (status = 201, description = "Lot created", body = LotResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "A lot with this floor, area and number already exists"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn create_lot(
    State(state): State<AppState>,
    _perm: RequiresPermission<resource::Lots, operation::CreateAll>,
    Json(data): Json<LotCreate>,
) -> Result<(StatusCode, Json<LotResponse>)> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Lots::new(&mut pool_conn);

    let created = repo.create(&data.into()).await?;

    Ok((StatusCode::CREATED, Json(LotResponse::from(created))))
}

/// Get a parking lot by ID
#[utoipa::path(
    get,
    path = "/lots/{lot_id}",
    tag = "lots",
    summary = "Get lot by ID",
    params(
        ("lot_id" = String, Path, description = "Lot ID (UUID)"),
    ),
    responses(
        (status = 200, description = "Lot", body = LotResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lot not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn get_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<LotId>,
    _perm: RequiresPermission<resource::Lots, operation::ReadOwn>,
) -> Result<Json<LotResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Lots::new(&mut pool_conn);

    let lot = repo.get_by_id(lot_id).await?.ok_or(Error::NotFound {
        resource: "lot".to_string(),
        id: lot_id.to_string(),
    })?;

    Ok(Json(LotResponse::from(lot)))
}

/// Update a parking lot
#[utoipa::path(
    patch,
    path = "/lots/{lot_id}",
    tag = "lots",
    summary = "Update lot",
    params(
        ("lot_id" = String, Path, description = "Lot ID (UUID)"),
    ),
    request_body = LotUpdate,
    responses(
        (status = 200, description = "Updated lot", body = LotResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Lot not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn update_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<LotId>,
    _perm: RequiresPermission<resource::Lots, operation::UpdateAll>,
    Json(data): Json<LotUpdate>,
) -> Result<Json<LotResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Lots::new(&mut pool_conn);

    let updated = repo.update(lot_id, &data.into()).await?;

    Ok(Json(LotResponse::from(updated)))
}

/// Delete a parking lot
#[utoipa::path(
    delete,
    path = "/lots/{lot_id}",
    tag = "lots",
    summary = "Delete lot",
    params(
        ("lot_id" = String, Path, description = "Lot ID (UUID)"),
    ),
    responses(
        (status = 204, description = "Lot deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Lot not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn delete_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<LotId>,
    _perm: RequiresPermission<resource::Lots, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Lots::new(&mut pool_conn);

    if !repo.delete(lot_id).await? {
        return Err(Error::NotFound {
            resource: "lot".to_string(),
            id: lot_id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{add_auth_headers, create_test_app, create_test_lot, create_test_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_lot_manager_creates_lot(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let manager = create_test_user(&pool, Role::LotManager).await;

        let response = app
            .post("/admin/api/v1/lots")
            .add_header(add_auth_headers(&manager).0, add_auth_headers(&manager).1)
            .json(&json!({
                "floor": "2",
                "area": "B",
                "lot_number": 14
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let lot: LotResponse = response.json();
        assert_eq!(lot.floor, "2");
        assert!(lot.available);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_standard_user_cannot_create_lot(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;

        let response = app
            .post("/admin/api/v1/lots")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .json(&json!({
                "floor": "1",
                "area": "A",
                "lot_number": 1
            }))
            .await;

        response.assert_status_forbidden();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_lot_identity_conflicts(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let manager = create_test_user(&pool, Role::LotManager).await;

        let body = json!({"floor": "1", "area": "A", "lot_number": 1});

        app.post("/admin/api/v1/lots")
            .add_header(add_auth_headers(&manager).0, add_auth_headers(&manager).1)
            .json(&body)
            .await
            .assert_status(StatusCode::CREATED);

        let response = app
            .post("/admin/api/v1/lots")
            .add_header(add_auth_headers(&manager).0, add_auth_headers(&manager).1)
            .json(&body)
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_any_user_reads_lots(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;
        let lot = create_test_lot(&pool, "1", "A", 1).await;

        let response = app
            .get("/admin/api/v1/lots")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .await;

        response.assert_status_ok();
        let lots: Vec<LotResponse> = response.json();
        assert!(lots.iter().any(|l| l.id == lot.id));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_availability_board_statuses(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;
        let manager = create_test_user(&pool, Role::LotManager).await;

        let open_lot = create_test_lot(&pool, "1", "A", 1).await;
        let closed_lot = create_test_lot(&pool, "1", "A", 2).await;

        // Take the second lot out of service
        app.patch(&format!("/admin/api/v1/lots/{}", closed_lot.id))
            .add_header(add_auth_headers(&manager).0, add_auth_headers(&manager).1)
            .json(&json!({"available": false}))
            .await
            .assert_status_ok();

        let response = app
            .get("/admin/api/v1/lots/availability")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .await;

        response.assert_status_ok();
        let board: Vec<LotAvailabilityResponse> = response.json();

        let open = board.iter().find(|row| row.lot.id == open_lot.id).unwrap();
        assert_eq!(open.status, LotStatus::Available);

        let closed = board.iter().find(|row| row.lot.id == closed_lot.id).unwrap();
        assert_eq!(closed.status, LotStatus::Unavailable);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_missing_lot_is_not_found(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let manager = create_test_user(&pool, Role::LotManager).await;

        let response = app
            .delete(&format!("/admin/api/v1/lots/{}", uuid::Uuid::new_v4()))
            .add_header(add_auth_headers(&manager).0, add_auth_headers(&manager).1)
            .await;

        response.assert_status_not_found();
    }
}

use crate::{
    api::models::users::{CurrentUser, ListUsersQuery, UserCreate, UserResponse, UserUpdate},
    auth::permissions::{operation, resource, user_can, RequiresPermission},
    db::{
        handlers::{Credits, Repository, Users},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{Operation, Resource, UserId},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::db::handlers::users::UserFilter;

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "List all users",
    params(
        ListUsersQuery
    ),
    responses(
        (status = 200, description = "List of users", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
    _perm: RequiresPermission<resource::Users, operation::ReadAll>,
) -> Result<Json<Vec<UserResponse>>> {
    let (skip, limit) = query.pagination.params();

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let users = repo.list(&UserFilter::new(skip, limit)).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    summary = "Create a new user",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Username or email already taken"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    _perm: RequiresPermission<resource::Users, operation::CreateAll>,
    Json(data): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let created = {
        let mut repo = Users::new(&mut tx);
        repo.create(&UserCreateDBRequest::from(data)).await?
    };

    // Give initial credits to standard users if configured
    let initial_credits = state.config.credits.initial_credits_for_standard_users;
    if initial_credits > rust_decimal::Decimal::ZERO {
        let mut credits_repo = Credits::new(&mut tx);
        credits_repo
            .create_transaction(&crate::db::models::credits::CreditTransactionCreateDBRequest {
                user_id: created.id,
                transaction_type: crate::db::models::credits::CreditTransactionType::AdminGrant,
                amount: initial_credits,
                description: Some("Initial credits on account creation".to_string()),
            })
            .await?;
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

/// Get the currently authenticated user
#[utoipa::path(
    get,
    path = "/users/current",
    tag = "users",
    summary = "Get current user",
    description = "Get the profile and credit balance of the currently authenticated user",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    _perm: RequiresPermission<resource::Users, operation::ReadOwn>,
    current_user: CurrentUser,
) -> Result<Json<UserResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let user = {
        let mut repo = Users::new(&mut pool_conn);
        repo.get_by_id(current_user.id).await?.ok_or(Error::NotFound {
            resource: "user".to_string(),
            id: current_user.id.to_string(),
        })?
    };

    let balance = Credits::new(&mut pool_conn).get_user_balance(current_user.id).await?;

    Ok(Json(UserResponse::from(user).with_credit_balance(balance)))
}

/// Update the currently authenticated user's profile
#[utoipa::path(
    patch,
    path = "/users/current",
    tag = "users",
    summary = "Update current user",
    description = "Update the current user's profile. Role changes require user management permissions.",
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - role changes require user management permissions"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn update_current_user(
    State(state): State<AppState>,
    perm: RequiresPermission<resource::Users, operation::UpdateOwn>,
    Json(data): Json<UserUpdate>,
) -> Result<Json<UserResponse>> {
    // Changing your own roles requires the all-users update grant
    if data.roles.is_some() && !user_can(&perm.user, Resource::Users, Operation::UpdateAll) {
        return Err(Error::InsufficientPermissions {
            required: crate::types::Permission::Allow(Resource::Users, Operation::UpdateAll),
            action: Operation::UpdateAll,
            resource: "Users".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let updated = repo.update(perm.user.id, &UserUpdateDBRequest::new(data)).await?;

    Ok(Json(UserResponse::from(updated)))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "users",
    summary = "Get user by ID",
    params(
        ("user_id" = String, Path, description = "User ID (UUID)"),
    ),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    _perm: RequiresPermission<resource::Users, operation::ReadAll>,
) -> Result<Json<UserResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let user = {
        let mut repo = Users::new(&mut pool_conn);
        repo.get_by_id(user_id).await?.ok_or(Error::NotFound {
            resource: "user".to_string(),
            id: user_id.to_string(),
        })?
    };

    let balance = Credits::new(&mut pool_conn).get_user_balance(user_id).await?;

    Ok(Json(UserResponse::from(user).with_credit_balance(balance)))
}

/// Update a user
#[utoipa::path(
    patch,
    path = "/users/{user_id}",
    tag = "users",
    summary = "Update user",
    params(
        ("user_id" = String, Path, description = "User ID (UUID)"),
    ),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    _perm: RequiresPermission<resource::Users, operation::UpdateAll>,
    Json(data): Json<UserUpdate>,
) -> Result<Json<UserResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let updated = repo.update(user_id, &UserUpdateDBRequest::new(data)).await?;

    Ok(Json(UserResponse::from(updated)))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    tag = "users",
    summary = "Delete user",
    params(
        ("user_id" = String, Path, description = "User ID (UUID)"),
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    perm: RequiresPermission<resource::Users, operation::DeleteAll>,
) -> Result<StatusCode> {
    // Deleting your own account would orphan the session mid-request
    if user_id == perm.user.id {
        return Err(Error::BadRequest {
            message: "Cannot delete your own account".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    if !repo.delete(user_id).await? {
        return Err(Error::NotFound {
            resource: "user".to_string(),
            id: user_id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{add_auth_headers, create_test_admin_user, create_test_app, create_test_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_current_user(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;

        let response = app
            .get("/admin/api/v1/users/current")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .await;

        response.assert_status_ok();
        let body: UserResponse = response.json();
        assert_eq!(body.id, user.id);
        assert_eq!(body.credit_balance, Some(rust_decimal::Decimal::ZERO));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_users_requires_admin(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;

        let response = app
            .get("/admin/api/v1/users")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .await;

        response.assert_status_forbidden();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_admin_lists_users(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let admin = create_test_admin_user(&pool, Role::StandardUser).await;
        let _user = create_test_user(&pool, Role::StandardUser).await;

        let response = app
            .get("/admin/api/v1/users")
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;

        response.assert_status_ok();
        let users: Vec<UserResponse> = response.json();
        assert!(users.len() >= 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_own_profile(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;

        let response = app
            .patch("/admin/api/v1/users/current")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .json(&json!({
                "plate_number": "NEW-5678"
            }))
            .await;

        response.assert_status_ok();
        let body: UserResponse = response.json();
        assert_eq!(body.plate_number.as_deref(), Some("NEW-5678"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_standard_user_cannot_change_own_roles(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let user = create_test_user(&pool, Role::StandardUser).await;

        let response = app
            .patch("/admin/api/v1/users/current")
            .add_header(add_auth_headers(&user).0, add_auth_headers(&user).1)
            .json(&json!({
                "roles": ["billing_manager"]
            }))
            .await;

        response.assert_status_forbidden();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_admin_updates_user_roles(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let admin = create_test_admin_user(&pool, Role::StandardUser).await;
        let user = create_test_user(&pool, Role::StandardUser).await;

        let response = app
            .patch(&format!("/admin/api/v1/users/{}", user.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .json(&json!({
                "roles": ["lot_manager"]
            }))
            .await;

        response.assert_status_ok();
        let body: UserResponse = response.json();
        assert!(body.roles.contains(&Role::LotManager));
        assert!(body.roles.contains(&Role::StandardUser));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_user(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let admin = create_test_admin_user(&pool, Role::StandardUser).await;
        let user = create_test_user(&pool, Role::StandardUser).await;

        let response = app
            .delete(&format!("/admin/api/v1/users/{}", user.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;

        response.assert_status(StatusCode::NO_CONTENT);

        let response = app
            .get(&format!("/admin/api/v1/users/{}", user.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;
        response.assert_status_not_found();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cannot_delete_self(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone(), false).await;
        let admin = create_test_admin_user(&pool, Role::StandardUser).await;

        let response = app
            .delete(&format!("/admin/api/v1/users/{}", admin.id))
            .add_header(add_auth_headers(&admin).0, add_auth_headers(&admin).1)
            .await;

        response.assert_status_bad_request();
    }
}

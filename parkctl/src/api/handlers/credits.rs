use crate::{
    api::models::credits::{
        CreditTransactionCreate, CreditTransactionResponse, ListTransactionsQuery, UserBalanceResponse,
    },
    auth::permissions::{operation, resource, RequiresPermission},
    db::{
        handlers::{Credits, Repository, Users},
        models::credits::{CreditTransactionCreateDBRequest, CreditTransactionType},
    },
    errors::{Error, Result},
    types::UserId,
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;

/// Get the current user's credit balance
#[utoipa::path(
    get,
    path = "/users/current/credits/balance",
    tag = "credits",
    summary = "Get current user's credit balance",
    responses(
        (status = 200, description = "Current balance", body = UserBalanceResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn get_current_user_balance(
    State(state): State<AppState>,
    perm: RequiresPermission<resource::Credits, operation::ReadOwn>,
) -> Result<Json<UserBalanceResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let balance = Credits::new(&mut pool_conn).get_user_balance(perm.user.id).await?;

    Ok(Json(UserBalanceResponse {
        user_id: perm.user.id,
        current_balance: balance,
    }))
}

/// List the current user's credit transactions
#[utoipa::path(
    get,
    path = "/users/current/credits/transactions",
    tag = "credits",
    summary = "List current user's credit transactions",
    params(
        ListTransactionsQuery
    ),
    responses(
        (status = 200, description = "Transaction history, newest first", body = [CreditTransactionResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_current_user_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
    perm: RequiresPermission<resource::Credits, operation::ReadOwn>,
) -> Result<Json<Vec<CreditTransactionResponse>>> {
    let (skip, limit) = query.pagination.params();

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let transactions = Credits::new(&mut pool_conn)
        .list_user_transactions(perm.user.id, skip, limit)
        .await?;

    Ok(Json(transactions.into_iter().map(CreditTransactionResponse::from).collect()))
}

/// Get a user's credit balance
#[utoipa::path(
    get,
    path = "/users/{user_id}/credits/balance",
    tag = "credits",
    summary = "Get user's credit balance",
    params(
        ("user_id" = String, Path, description = "User ID (UUID)"),
    ),
    responses(
        (status = 200, description = "Current balance", body = UserBalanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn get_user_balance(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    _perm: RequiresPermission<resource::Credits, operation::ReadAll>,
) -> Result<Json<UserBalanceResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Users::new(&mut pool_conn).get_by_id(user_id).await?.ok_or(Error::NotFound {
        resource: "user".to_string(),
        id: user_id.to_string(),
    })?;

    let balance = Credits::new(&mut pool_conn).get_user_balance(user_id).await?;

    Ok(Json(UserBalanceResponse {
        user_id,
        current_balance: balance,
    }))
}

/// List a user's credit transactions
#[utoipa::path(
    get,
    path = "/users/{user_id}/credits/transactions",
    tag = "credits",
    summary = "List user's credit transactions",
    params(
        ("user_id" = String, Path, description = "User ID (UUID)"),
        ListTransactionsQuery
    ),
    responses(
        (status = 200, description = "Transaction history, newest first", body = [CreditTransactionResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_user_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(query): Query<ListTransactionsQuery>,
    _perm: RequiresPermission<resource::Credits, operation::ReadAll>,
) -> Result<Json<Vec<CreditTransactionResponse>>> {
    let (skip, limit) = query.pagination.params();

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Users::new(&mut pool_conn).get_by_id(user_id).await?.ok_or(Error::NotFound {
        resource: "user".to_string(),
        id: user_id.to_string(),
    })?;

    let transactions = Credits::new(&mut pool_conn)
        .list_user_transactions(user_id, skip, limit)
        .await?;

    Ok(Json(transactions.into_iter().map(CreditTransactionResponse::from).collect()))
}

/// Grant or remove credits for a user
#[utoipa::path(
    post,
    path = "/users/{user_id}/credits",
    tag = "credits",
    summary = "Grant or remove credits",
    description = "Appends an admin_grant or admin_removal transaction to the user's ledger. Removals that would overdraw the balance are refused.",
    params(
        ("user_id" = String, Path, description = "User ID (UUID)"),
    ),
    request_body = CreditTransactionCreate,
    responses(
        (status = 201, description = "Transaction recorded", body = CreditTransactionResponse),
        (status = 400, description = "Invalid transaction type, non-positive amount, or overdraw"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip(state, perm, data), fields(admin_id = %perm.user.id, user_id = %user_id))]
pub async fn add_user_credits(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    perm: RequiresPermission<resource::Credits, operation::CreateAll>,
    Json(data): Json<CreditTransactionCreate>,
) -> Result<(StatusCode, Json<CreditTransactionResponse>)> {
    if !matches!(
        data.transaction_type,
        CreditTransactionType::AdminGrant | CreditTransactionType::AdminRemoval
    ) {
        return Err(Error::BadRequest {
            message: "Only admin_grant and admin_removal transactions can be created directly".to_string(),
        });
    }
    if data.amount <= Decimal::ZERO {
        return Err(Error::BadRequest {
            message: "Transaction amount must be positive".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Users::new(&mut pool_conn).get_by_id(user_id).await?.ok_or(Error::NotFound {
        resource: "user".to_string(),
        id: user_id.to_string(),
    })?;

    let mut repo = Credits::new(&mut pool_conn);

    if data.transaction_type == CreditTransactionType::AdminRemoval {
        let balance = repo.get_user_balance(user_id).await?;
        if balance < data.amount {
            return Err(Error::BadRequest {
                message: format!("Removal of {} would overdraw balance {balance}", data.amount),
            });
        }
    }

    let description = data
        .description
        .or_else(|| Some(format!("adjusted by {}", perm.user.id)));

    let transaction = repo
        .create_transaction(&CreditTransactionCreateDBRequest {
            user_id,
            transaction_type: data.transaction_type,
            amount: data.amount,
            description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CreditTransactionResponse::from(transaction))))
}

/// List every user's credit balance
#[utoipa::path(
    get,
    path = "/credits/balances",
    tag = "credits",
    summary = "List all user balances",
    responses(
        (status = 200, description = "Balances for every user with ledger activity", body = [UserBalanceResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_all_user_balances(
    State(state): State<AppState>,
    _perm: RequiresPermission<resource::Credits, operation::ReadAll>,
) -> Result<Json<Vec<UserBalanceResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let balances = Credits::new(&mut pool_conn).list_all_user_balances().await?;

    Ok(Json(balances.into_iter().map(UserBalanceResponse::from).collect()))
}

/// List credit transactions across all users
#[utoipa::path(
    get,
    path = "/credits/transactions",
    tag = "credits",
    summary = "List all credit transactions",
    params(
        ListTransactionsQuery
    ),
    responses(
        (status = 200, description = "Transactions across all users, newest first", body = [CreditTransactionResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn list_all_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
    _perm: RequiresPermission<resource::Credits, operation::ReadAll>,
) -> Result<Json<Vec<CreditTransactionResponse>>> {
    let (skip, limit) = query.pagination.params();

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let transactions = Credits::new(&mut pool_conn).list_all_transactions(skip, limit).await?;

    Ok(Json(transactions.into_iter().map(CreditTransactionResponse::from).collect()))
}

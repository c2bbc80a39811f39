//! # parkctl: Control Service for Parking Reservations
//!
//! `parkctl` is the control plane for a reserved-parking facility. It manages parking
//! lots, reservation booking with conflict detection and pricing, a prepaid credit
//! ledger, top-up review, and rate schedules, all behind a RESTful management API.
//!
//! ## Overview
//!
//! Drivers hold prepaid credit balances and book lots for a fixed interval. A booking
//! is priced from the rate schedule in force (a flat reservation fee plus a per-minute
//! rate), charged against the driver's balance, and recorded in an append-only ledger.
//! Lot managers curate the lot inventory and the reservation book; billing staff
//! review top-up requests and adjust balances.
//!
//! ### Request Flow
//!
//! Requests to `/admin/api/v1/*` pass through authentication (JWT session cookies for
//! browser clients, or a trusted proxy header for SSO deployments), then through the
//! typed permission extractor ([`auth::permissions::RequiresPermission`]), and finally
//! reach a handler which talks to PostgreSQL through the repository layer ([`db`]).
//!
//! Booking is the one multi-step write: the handler takes a per-lot advisory lock,
//! checks the candidate interval against existing reservations ([`booking::conflict`]),
//! prices it ([`booking::pricing`]), verifies the balance, and inserts the reservation
//! together with its ledger charge in a single transaction.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use parkctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = parkctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     parkctl::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod booking;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::{
    api::models::users::Role,
    auth::password,
    db::handlers::{Repository, Users},
    db::models::users::UserCreateDBRequest,
    openapi::ApiDoc,
};
use axum::{
    http::HeaderValue,
    routing::{delete, get, patch, post},
    Router,
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, instrument, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{LotId, RateScheduleId, ReservationId, TopUpId, UserId};

/// Application state shared across all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the parkctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: creates the admin on first startup, or updates the password on
/// later startups if one is configured.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(
    username: &str,
    email: &str,
    password: Option<&str>,
    db: &PgPool,
) -> Result<UserId, sqlx::Error> {
    let password_hash = if let Some(pwd) = password {
        Some(password::hash_string(pwd).map_err(|e| sqlx::Error::Encode(format!("Failed to hash admin password: {e}").into()))?)
    } else {
        None
    };

    let mut tx = db.begin().await?;

    let existing_user = Users::new(&mut tx)
        .get_user_by_email(email)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("Failed to check existing user: {e}")))?;
    if let Some(existing_user) = existing_user {
        if let Some(password_hash) = password_hash {
            sqlx::query("UPDATE users SET password_hash = $1 WHERE email = $2")
                .bind(password_hash)
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        return Ok(existing_user.id);
    }

    let user_create = UserCreateDBRequest {
        username: username.to_string(),
        email: email.to_string(),
        display_name: None,
        contact_number: None,
        plate_number: None,
        is_admin: true,
        roles: vec![Role::StandardUser],
        auth_source: "system".to_string(),
        password_hash,
    };

    let created_user = Users::new(&mut tx)
        .create(&user_create)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("Failed to create admin user: {e}")))?;

    tx.commit().await?;
    Ok(created_user.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    let mut origins = Vec::new();
    for origin in &cors_config.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(cors_config.allow_credentials)
        .expose_headers(vec![axum::http::header::LOCATION]);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    // Authentication routes (at root level, can be masked when deployed behind SSO proxy)
    let auth_routes = Router::new()
        .route(
            "/authentication/register",
            get(api::handlers::auth::get_registration_info).post(api::handlers::auth::register),
        )
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .route("/authentication/password-change", post(api::handlers::auth::change_password))
        .with_state(state.clone());

    // Management API routes
    let api_routes = Router::new()
        // User management
        .route("/users", get(api::handlers::users::list_users))
        .route("/users", post(api::handlers::users::create_user))
        .route("/users/current", get(api::handlers::users::get_current_user))
        .route("/users/current", patch(api::handlers::users::update_current_user))
        .route(
            "/users/current/reservations",
            get(api::handlers::reservations::list_current_user_reservations),
        )
        .route(
            "/users/current/credits/balance",
            get(api::handlers::credits::get_current_user_balance),
        )
        .route(
            "/users/current/credits/transactions",
            get(api::handlers::credits::list_current_user_transactions),
        )
        .route("/users/current/top-ups", get(api::handlers::top_ups::list_current_user_top_ups))
        .route("/users/{user_id}", get(api::handlers::users::get_user))
        .route("/users/{user_id}", patch(api::handlers::users::update_user))
        .route("/users/{user_id}", delete(api::handlers::users::delete_user))
        // Credits as user sub-resources
        .route("/users/{user_id}/credits", post(api::handlers::credits::add_user_credits))
        .route("/users/{user_id}/credits/balance", get(api::handlers::credits::get_user_balance))
        .route(
            "/users/{user_id}/credits/transactions",
            get(api::handlers::credits::list_user_transactions),
        )
        // Lot management
        .route("/lots", get(api::handlers::lots::list_lots))
        .route("/lots", post(api::handlers::lots::create_lot))
        .route("/lots/availability", get(api::handlers::lots::lot_availability))
        .route("/lots/{lot_id}", get(api::handlers::lots::get_lot))
        .route("/lots/{lot_id}", patch(api::handlers::lots::update_lot))
        .route("/lots/{lot_id}", delete(api::handlers::lots::delete_lot))
        // Reservations
        .route("/reservations", post(api::handlers::reservations::create_reservation))
        .route("/reservations", get(api::handlers::reservations::list_reservations))
        .route("/reservations/{reservation_id}", get(api::handlers::reservations::get_reservation))
        .route(
            "/reservations/{reservation_id}",
            delete(api::handlers::reservations::delete_reservation),
        )
        .route(
            "/reservations/{reservation_id}/early-end",
            post(api::handlers::reservations::early_end_reservation),
        )
        // Rate schedules
        .route("/rates", get(api::handlers::rates::list_rates))
        .route("/rates", post(api::handlers::rates::create_rate_schedule))
        .route("/rates/current", get(api::handlers::rates::get_current_rates))
        // Billing views
        .route("/credits/balances", get(api::handlers::credits::list_all_user_balances))
        .route("/credits/transactions", get(api::handlers::credits::list_all_transactions))
        // Top-ups
        .route("/top-ups", post(api::handlers::top_ups::create_top_up))
        .route("/top-ups", get(api::handlers::top_ups::list_top_ups))
        .route("/top-ups/{top_up_id}/approve", post(api::handlers::top_ups::approve_top_up))
        .route("/top-ups/{top_up_id}/reject", post(api::handlers::top_ups::reject_top_up))
        // Dashboard
        .route("/dashboard/overview", get(api::handlers::dashboard::dashboard_overview))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .nest("/admin/api/v1", api_routes)
        .merge(Scalar::with_url("/admin/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Connect to PostgreSQL using the configured pool settings
async fn connect_pool(config: &Config) -> anyhow::Result<PgPool> {
    use std::time::Duration;

    let settings = &config.database.pool;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout((settings.idle_timeout_secs > 0).then(|| Duration::from_secs(settings.idle_timeout_secs)))
        .max_lifetime((settings.max_lifetime_secs > 0).then(|| Duration::from_secs(settings.max_lifetime_secs)))
        .connect(&config.database.url)
        .await?;

    Ok(pool)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs migrations
///    and ensures the initial admin user exists
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles requests
///    until the shutdown signal resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = connect_pool(&config).await?;
        migrator().run(&pool).await?;

        create_initial_admin_user(&config.admin_username, &config.admin_email, config.admin_password.as_deref(), &pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {e}"))?;

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(&state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("parkctl listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::create_initial_admin_user;
    use crate::db::handlers::Users;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_healthz(pool: PgPool) {
        let (server, _) = crate::test_utils::create_test_app(pool, false).await;

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_initial_admin_user_is_idempotent(pool: PgPool) {
        let first = create_initial_admin_user("admin", "admin@test.com", Some("first-password"), &pool)
            .await
            .unwrap();
        let second = create_initial_admin_user("admin", "admin@test.com", Some("second-password"), &pool)
            .await
            .unwrap();
        assert_eq!(first, second);

        let mut conn = pool.acquire().await.unwrap();
        let admin = Users::new(&mut conn).get_user_by_email("admin@test.com").await.unwrap().unwrap();
        assert!(admin.is_admin);

        // Second call rotated the password
        let verified = crate::auth::password::verify_string("second-password", admin.password_hash.as_deref().unwrap()).unwrap();
        assert!(verified);
    }
}

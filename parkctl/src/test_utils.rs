//! Test utilities for integration testing (available with `test-utils` feature).

use crate::config::{NativeAuthConfig, ProxyHeaderAuthConfig, SessionConfig};
use crate::{
    api::models::users::{Role, UserResponse},
    db::{
        handlers::{Lots, Repository, Users},
        models::{lots::LotCreateDBRequest, lots::LotDBResponse, users::UserCreateDBRequest},
    },
};
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

/// Build a test server backed by the given pool.
///
/// Proxy header auth is enabled so tests can impersonate users via
/// [`add_auth_headers`]; pass `use_native_auth` to also exercise the
/// login and registration endpoints.
pub async fn create_test_app(pool: PgPool, use_native_auth: bool) -> (TestServer, crate::AppState) {
    let mut config = create_test_config();
    config.auth.native.enabled = use_native_auth;

    let state = crate::AppState::builder().db(pool).config(config).build();
    let router = crate::build_router(&state).expect("Failed to build router");

    let server = TestServer::new(router.into_make_service()).expect("Failed to create test server");
    (server, state)
}

pub fn create_test_config() -> crate::config::Config {
    crate::config::Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        admin_username: "admin".to_string(),
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        auth: crate::config::AuthConfig {
            native: NativeAuthConfig {
                enabled: true,
                session: SessionConfig {
                    cookie_secure: false,
                    ..Default::default()
                },
                ..Default::default()
            },
            proxy_header: ProxyHeaderAuthConfig {
                enabled: true,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

pub async fn create_test_user(pool: &PgPool, role: Role) -> UserResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let user_id = Uuid::new_v4();
    let username = format!("testuser_{}", user_id.simple());
    let email = format!("{username}@example.com");
    let plate_number = format!("TST-{}", &user_id.simple().to_string()[..4]);

    let user_create = UserCreateDBRequest {
        username,
        email,
        display_name: Some("Test User".to_string()),
        contact_number: None,
        plate_number: Some(plate_number),
        is_admin: false,
        roles: vec![role],
        auth_source: "test".to_string(),
        password_hash: None,
    };

    let user = users_repo.create(&user_create).await.expect("Failed to create test user");
    UserResponse::from(user)
}

pub async fn create_test_admin_user(pool: &PgPool, role: Role) -> UserResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let user_id = Uuid::new_v4();
    let username = format!("testadmin_{}", user_id.simple());
    let email = format!("{username}@example.com");

    let user_create = UserCreateDBRequest {
        username,
        email,
        display_name: Some("Test Admin User".to_string()),
        contact_number: None,
        plate_number: None,
        is_admin: true,
        roles: vec![role],
        auth_source: "test".to_string(),
        password_hash: None,
    };

    let user = users_repo.create(&user_create).await.expect("Failed to create test admin user");
    UserResponse::from(user)
}

/// Proxy auth header pair asserting the given user's identity
pub fn add_auth_headers(user: &UserResponse) -> (HeaderName, HeaderValue) {
    let config = ProxyHeaderAuthConfig::default();
    (
        HeaderName::try_from(config.header_name).expect("Invalid header name"),
        HeaderValue::try_from(user.email.clone()).expect("Invalid header value"),
    )
}

pub async fn create_test_lot(pool: &PgPool, floor: &str, area: &str, lot_number: i32) -> LotDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut lots_repo = Lots::new(&mut conn);

    lots_repo
        .create(&LotCreateDBRequest {
            floor: floor.to_string(),
            area: area.to_string(),
            lot_number,
            available: true,
        })
        .await
        .expect("Failed to create test lot")
}

/// The system user seeded by the migrations, hidden from the user API
pub async fn get_system_user(conn: &mut PgConnection) -> UserResponse {
    #[derive(FromRow)]
    struct SystemUser {
        id: Uuid,
        username: String,
        email: String,
        display_name: Option<String>,
        is_admin: bool,
        auth_source: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    }

    let user = sqlx::query_as::<_, SystemUser>("SELECT * FROM users WHERE id = $1")
        .bind(Uuid::nil())
        .fetch_one(&mut *conn)
        .await
        .expect("Failed to get system user");

    UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        display_name: user.display_name,
        contact_number: None,
        plate_number: None,
        is_admin: user.is_admin,
        roles: vec![],
        created_at: user.created_at,
        updated_at: user.updated_at,
        auth_source: user.auth_source,
        credit_balance: None,
    }
}

//! OpenAPI documentation for the management API at `/admin/api/v1/*`.

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::api;
use crate::db::models::{credits::CreditTransactionType, top_ups::TopUpStatus};

/// Security scheme for the management API (session cookie).
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "session_token".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("parkctl_session"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/admin/api/v1", description = "Management API server")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Users
        api::handlers::users::list_users,
        api::handlers::users::create_user,
        api::handlers::users::get_current_user,
        api::handlers::users::update_current_user,
        api::handlers::users::get_user,
        api::handlers::users::update_user,
        api::handlers::users::delete_user,
        // Lots
        api::handlers::lots::list_lots,
        api::handlers::lots::lot_availability,
        api::handlers::lots::create_lot,
        api::handlers::lots::get_lot,
        api::handlers::lots::update_lot,
        api::handlers::lots::delete_lot,
        // Reservations
        api::handlers::reservations::create_reservation,
        api::handlers::reservations::list_reservations,
        api::handlers::reservations::list_current_user_reservations,
        api::handlers::reservations::get_reservation,
        api::handlers::reservations::early_end_reservation,
        api::handlers::reservations::delete_reservation,
        // Rates
        api::handlers::rates::get_current_rates,
        api::handlers::rates::list_rates,
        api::handlers::rates::create_rate_schedule,
        // Credits
        api::handlers::credits::get_current_user_balance,
        api::handlers::credits::list_current_user_transactions,
        api::handlers::credits::get_user_balance,
        api::handlers::credits::list_user_transactions,
        api::handlers::credits::add_user_credits,
        api::handlers::credits::list_all_user_balances,
        api::handlers::credits::list_all_transactions,
        // Top-ups
        api::handlers::top_ups::create_top_up,
        api::handlers::top_ups::list_current_user_top_ups,
        api::handlers::top_ups::list_top_ups,
        api::handlers::top_ups::approve_top_up,
        api::handlers::top_ups::reject_top_up,
        // Dashboard
        api::handlers::dashboard::dashboard_overview,
    ),
    components(
        schemas(
            api::models::users::Role,
            api::models::users::UserCreate,
            api::models::users::UserUpdate,
            api::models::users::UserResponse,
            api::models::auth::RegisterRequest,
            api::models::auth::LoginRequest,
            api::models::auth::ChangePasswordRequest,
            api::models::auth::RegistrationInfo,
            api::models::auth::AuthResponse,
            api::models::auth::AuthSuccessResponse,
            api::models::lots::LotCreate,
            api::models::lots::LotUpdate,
            api::models::lots::LotResponse,
            api::models::lots::LotStatus,
            api::models::lots::LotAvailabilityResponse,
            api::models::reservations::ReservationCreate,
            api::models::reservations::ReservationResponse,
            api::models::reservations::ReservationCreatedResponse,
            api::models::rates::RateScheduleCreate,
            api::models::rates::RateScheduleResponse,
            api::models::credits::CreditTransactionCreate,
            api::models::credits::CreditTransactionResponse,
            api::models::credits::UserBalanceResponse,
            api::models::top_ups::TopUpCreate,
            api::models::top_ups::TopUpResponse,
            api::models::dashboard::ReservationsPerDay,
            api::models::dashboard::OccupancyBreakdown,
            api::models::dashboard::DashboardOverviewResponse,
            CreditTransactionType,
            TopUpStatus,
        )
    ),
    tags(
        (name = "users", description = "User management"),
        (name = "lots", description = "Parking lot management and availability"),
        (name = "reservations", description = "Reservation booking and lifecycle"),
        (name = "rates", description = "Rate schedule management"),
        (name = "credits", description = "Credit ledger and balances"),
        (name = "top-ups", description = "Top-up submission and review"),
        (name = "dashboard", description = "Operational overview"),
    ),
    info(
        title = "parkctl Management API",
        description = "Management API for the parking reservation control service",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

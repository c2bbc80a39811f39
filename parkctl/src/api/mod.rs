//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! The API is divided into several functional areas:
//!
//! - **Authentication** (`/authentication/*`): Login, registration, password management
//! - **Users** (`/admin/api/v1/users/*`): User management and profiles
//! - **Lots** (`/admin/api/v1/lots/*`): Parking lot inventory and availability
//! - **Reservations** (`/admin/api/v1/reservations/*`): Booking, early end, cancellation
//! - **Rates** (`/admin/api/v1/rates/*`): Rate schedule management
//! - **Credits** (`/admin/api/v1/credits/*`): Credit balances and transactions
//! - **Top-ups** (`/admin/api/v1/top-ups/*`): Top-up submission and review
//! - **Dashboard** (`/admin/api/v1/dashboard/*`): Operational overview for managers
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI/Swagger annotations using `utoipa`.
//! API documentation is available at `/admin/docs` when the server is running.

pub mod handlers;
pub mod models;

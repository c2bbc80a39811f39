//! HTTP request handlers for all API endpoints.
//!
//! This module contains Axum route handlers organized by resource type.
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication and authorization checks
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`auth`]: Authentication, login, registration, and password management
//! - [`credits`]: Credit balances, transaction history, and admin adjustments
//! - [`dashboard`]: Operational overview for lot managers
//! - [`lots`]: Parking lot CRUD and the availability board
//! - [`rates`]: Rate schedule publication and history
//! - [`reservations`]: Booking, listing, early end, and cancellation
//! - [`top_ups`]: Top-up submission and billing review
//! - [`users`]: User CRUD operations and profile management
//!
//! # Authentication
//!
//! Most handlers require authentication via session cookies or proxy headers.
//! Handlers declare their authorization requirement with the typed
//! [`crate::auth::permissions::RequiresPermission`] extractor.
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which automatically converts to
//! appropriate HTTP status codes and JSON error responses.

pub mod auth;
pub mod credits;
pub mod dashboard;
pub mod lots;
pub mod rates;
pub mod reservations;
pub mod top_ups;
pub mod users;

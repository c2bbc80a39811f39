//! API request/response models.
//!
//! DTOs for the HTTP surface. Conversions from the `db::models` response
//! types live next to the DTOs they produce.

pub mod auth;
pub mod credits;
pub mod dashboard;
pub mod lots;
pub mod pagination;
pub mod rates;
pub mod reservations;
pub mod top_ups;
pub mod users;

//! Database record structures matching table schemas.
//!
//! Each entity has three model types:
//! - `*CreateDBRequest`: data needed to insert a row
//! - `*UpdateDBRequest`: partial update, `None` fields are left untouched
//! - `*DBResponse`: the row as returned to the rest of the service

pub mod credits;
pub mod lots;
pub mod rates;
pub mod reservations;
pub mod top_ups;
pub mod users;

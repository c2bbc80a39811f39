//! Repository implementations for database access.
//!
//! This module provides repository structs for each major entity in the system.
//! Repositories follow a consistent pattern and implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//! - Uses the connection's transaction for ACID guarantees
//!
//! # Available Repositories
//!
//! - [`Users`]: User account management and authentication
//! - [`Lots`]: Parking lot inventory
//! - [`Reservations`]: Reservation rows and the same-lot cutoff query
//! - [`Rates`]: Append-only rate schedule history
//! - [`Credits`]: Credit ledger and balance tracking
//! - [`TopUps`]: Top-up request lifecycle
//!
//! # Common Pattern
//!
//! All repositories follow this usage pattern:
//!
//! ```ignore
//! use parkctl::db::handlers::{Users, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Users::new(&mut tx);
//!     let users = repo.list(&filter).await?;
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod credits;
pub mod lots;
pub mod rates;
pub mod repository;
pub mod reservations;
pub mod top_ups;
pub mod users;

pub use credits::Credits;
pub use lots::Lots;
pub use rates::Rates;
pub use repository::Repository;
pub use reservations::Reservations;
pub use top_ups::TopUps;
pub use users::Users;

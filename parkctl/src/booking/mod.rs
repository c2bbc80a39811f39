//! Reservation booking domain logic.
//!
//! Pure functions shared by the reservation handlers:
//!
//! - [`conflict`]: decides whether a candidate reservation can coexist with
//!   the reservations already held on a lot
//! - [`pricing`]: computes the amount charged for a reservation
//!
//! Both modules are side-effect free. The handlers are responsible for
//! loading the relevant rows, filtering out early-ended reservations, and
//! persisting the outcome.

pub mod conflict;
pub mod pricing;

//! HTTP route handlers.

pub mod admin;
pub mod courts;
pub mod health;
pub mod profiles;
pub mod reservations;

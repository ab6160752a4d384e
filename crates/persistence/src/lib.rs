//! Persistence layer for the court reservation backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - `PgBookingStore`, the PostgreSQL implementation of the domain store traits

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod store;

pub use store::PgBookingStore;

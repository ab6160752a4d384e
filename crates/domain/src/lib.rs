//! Domain layer for the court reservation backend.
//!
//! This crate contains:
//! - Domain models (Court, Reservation, UserProfile, DisablementRequest)
//! - The persistence collaborator traits and an in-memory store
//! - Booking services: court registry, availability, reservation lifecycle,
//!   reputation ledger, disablement scheduler
//! - Domain error types

pub mod clock;
pub mod error;
pub mod models;
pub mod policy;
pub mod services;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use policy::BookingPolicy;
pub use services::BookingServices;
pub use store::{BookingStore, InMemoryStore};

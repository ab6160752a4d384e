//! Repository implementations for database operations.

pub mod court;
pub mod reservation;
pub mod user_profile;

pub use court::CourtRepository;
pub use reservation::{ReservationQuery, ReservationRepository, ReservationUpdate};
pub use user_profile::UserProfileRepository;

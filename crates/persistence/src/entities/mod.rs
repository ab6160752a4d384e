//! Database entity definitions.
//!
//! Entities are direct mappings to database rows. Rows convert into domain
//! records with `TryFrom`, since enumerated columns are stored as text.

pub mod court;
pub mod reservation;
pub mod user_profile;

pub use court::CourtEntity;
pub use reservation::ReservationEntity;
pub use user_profile::UserProfileEntity;

use thiserror::Error;

/// A stored row that does not describe a valid domain record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    #[error("unknown sport '{0}'")]
    UnknownSport(String),

    #[error("unknown reservation status '{0}'")]
    UnknownStatus(String),
}

//! Domain models for the court reservation backend.

pub mod court;
pub mod disablement;
pub mod reservation;
pub mod stats;
pub mod user;

pub use court::{Court, CreateCourtRequest, Sport};
pub use disablement::{DisablementRequest, DisablementWindow, UntilDateSpan};
pub use reservation::{
    CreateReservationRequest, ListReservationsQuery, NoShowCheckResponse,
    PostponeReservationRequest, ReasonRequest, Reservation, ReservationState,
};
pub use stats::{SportStats, SystemStats};
pub use user::{SetRatingRequest, UpsertProfileRequest, UserProfile};

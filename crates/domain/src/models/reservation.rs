//! Reservation domain models and state machine.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::DomainError;
use crate::models::court::Sport;

/// Reason recorded when a pending reservation expires unconfirmed.
pub const EXPIRED_REASON: &str = "Expired: not confirmed in time";
/// Reason recorded when the owner cancels a pending reservation.
pub const USER_CANCELLED_REASON: &str = "Cancelled by the user";
/// Default reason for an admin rejection without an explicit reason.
pub const ADMIN_REJECTED_REASON: &str = "Rejected by administrator";
/// Default reason for an admin cancellation without an explicit reason.
pub const ADMIN_CANCELLED_REASON: &str = "Cancelled by administrator";
/// Reason recorded when an approved reservation is marked as a no-show.
pub const NO_SHOW_REASON: &str = "User did not show up";

/// State of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    NoShow,
}

impl ReservationState {
    pub const ALL: [ReservationState; 5] = [
        ReservationState::Pending,
        ReservationState::Approved,
        ReservationState::Rejected,
        ReservationState::Cancelled,
        ReservationState::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationState::Pending => "pending",
            ReservationState::Approved => "approved",
            ReservationState::Rejected => "rejected",
            ReservationState::Cancelled => "cancelled",
            ReservationState::NoShow => "no_show",
        }
    }

    /// Rejected, cancelled and no-show reservations never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationState::Rejected | ReservationState::Cancelled | ReservationState::NoShow
        )
    }

    /// Permitted edges of the state machine.
    ///
    /// `Approved -> Approved` is the postpone edge: the schedule changes while
    /// the state is kept.
    pub fn can_transition_to(&self, to: ReservationState) -> bool {
        use ReservationState::*;
        matches!(
            (self, to),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Approved, Approved)
                | (Approved, Cancelled)
                | (Approved, NoShow)
        )
    }
}

impl std::fmt::Display for ReservationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReservationState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReservationState::Pending),
            "approved" => Ok(ReservationState::Approved),
            "rejected" => Ok(ReservationState::Rejected),
            "cancelled" => Ok(ReservationState::Cancelled),
            "no_show" => Ok(ReservationState::NoShow),
            other => Err(DomainError::validation(format!(
                "Unknown reservation state: {}",
                other
            ))),
        }
    }
}

/// A reservation of one court slot.
///
/// `date` and `time` are local wall-clock values at the venue; `date_time`
/// is the same moment as an instant. Court name and sport are snapshots
/// taken at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub court_id: Uuid,
    pub court_name: String,
    pub sport: Sport,
    pub date: NaiveDate,
    #[serde(with = "shared::time_format::hhmm")]
    pub time: NaiveTime,
    pub date_time: DateTime<Utc>,
    pub party_size: i32,
    pub state: ReservationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for booking a slot.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub court_id: Uuid,

    pub date: NaiveDate,

    #[validate(custom(function = "shared::validation::validate_time_of_day"))]
    pub time: String,

    #[validate(range(min = 1, max = 100, message = "Party size must be between 1 and 100"))]
    pub party_size: i32,
}

/// Request payload for moving a reservation to a new slot.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostponeReservationRequest {
    pub date: NaiveDate,

    #[validate(custom(function = "shared::validation::validate_time_of_day"))]
    pub time: String,
}

/// Optional reason attached to an admin rejection or cancellation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReasonRequest {
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

/// Query parameters for the admin reservation listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListReservationsQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// Result of a single-reservation no-show check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoShowCheckResponse {
    pub transitioned: bool,
    pub reservation: Reservation,
}

//! Persistence collaborator contracts.
//!
//! The booking services only talk to storage through these traits. Every
//! reservation state change goes through [`ReservationStore::transition_reservation`],
//! which must behave as a single-record compare-and-set on the current state.
//! Reputation side effects of a reservation write are applied in the same
//! atomic unit as the write itself, and a slot never holds two approved
//! reservations.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::{Court, DisablementWindow, Reservation, ReservationState, UserProfile};

pub use memory::InMemoryStore;

/// Error for a write that would leave two approved reservations on one slot.
pub fn slot_taken() -> DomainError {
    DomainError::Conflict("Another reservation is already approved for this slot".to_string())
}

/// Filter for reservation listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    pub user_id: Option<String>,
    pub court_id: Option<Uuid>,
    pub state: Option<ReservationState>,
    /// Only reservations whose `date_time` is strictly before this instant.
    pub due_before: Option<DateTime<Utc>>,
}

impl ReservationFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    pub fn in_state(state: ReservationState) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }

    pub fn due(state: ReservationState, before: DateTime<Utc>) -> Self {
        Self {
            state: Some(state),
            due_before: Some(before),
            ..Default::default()
        }
    }

    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.user_id
            .as_ref()
            .map_or(true, |id| &reservation.user_id == id)
            && self.court_id.map_or(true, |id| reservation.court_id == id)
            && self.state.map_or(true, |s| reservation.state == s)
            && self
                .due_before
                .map_or(true, |before| reservation.date_time < before)
    }
}

/// New slot for a reservation being postponed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub date_time: DateTime<Utc>,
}

/// A conditional state change: applied only if the stored state is `from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: ReservationState,
    pub to: ReservationState,
    /// Replaces the stored reason.
    pub reason: Option<String>,
    pub reschedule: Option<Schedule>,
    /// Penalize the owner in the same write.
    pub penalize_owner: bool,
    pub at: DateTime<Utc>,
}

impl StateTransition {
    pub fn new(from: ReservationState, to: ReservationState, at: DateTime<Utc>) -> Self {
        Self {
            from,
            to,
            reason: None,
            reschedule: None,
            penalize_owner: false,
            at,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.reschedule = Some(schedule);
        self
    }

    pub fn penalizing_owner(mut self) -> Self {
        self.penalize_owner = true;
        self
    }

    /// Applies the change to an in-memory record.
    pub fn apply(&self, reservation: &mut Reservation) {
        reservation.state = self.to;
        reservation.reason = self.reason.clone();
        if let Some(schedule) = self.reschedule {
            reservation.date = schedule.date;
            reservation.time = schedule.time;
            reservation.date_time = schedule.date_time;
        }
        reservation.updated_at = self.at;
    }
}

/// Court records.
#[async_trait]
pub trait CourtStore: Send + Sync {
    /// Inserts the court unless one with the same name exists. Returns
    /// whether a row was inserted.
    async fn insert_court_if_absent(&self, court: &Court) -> DomainResult<bool>;

    async fn find_court(&self, id: Uuid) -> DomainResult<Option<Court>>;

    /// All courts ordered by display order.
    async fn list_courts(&self) -> DomainResult<Vec<Court>>;

    /// Sets (`Some`) or clears (`None`) the disablement window.
    async fn save_disablement(
        &self,
        id: Uuid,
        window: Option<DisablementWindow>,
    ) -> DomainResult<Option<Court>>;
}

/// Reservation records.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Stores a new reservation and bumps its owner's reservation counter in
    /// one write. Fails with `NotFound`, storing nothing, when the owner has
    /// no profile.
    async fn insert_reservation(&self, reservation: &Reservation) -> DomainResult<()>;

    async fn find_reservation(&self, id: Uuid) -> DomainResult<Option<Reservation>>;

    /// Matching reservations ordered by `date_time` ascending.
    async fn list_reservations(&self, filter: &ReservationFilter) -> DomainResult<Vec<Reservation>>;

    /// Whether an approved reservation holds the slot, ignoring `excluding`.
    async fn approved_exists_for_slot(
        &self,
        court_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        excluding: Option<Uuid>,
    ) -> DomainResult<bool>;

    /// Compare-and-set on the reservation state. Returns the updated record,
    /// or `None` when the reservation is absent or not in `transition.from`.
    ///
    /// With `penalize_owner` the owner's penalty is recorded in the same
    /// write; if it cannot be, nothing changes. A transition into `Approved`
    /// fails with [`slot_taken`] while another approved reservation holds the
    /// target slot.
    async fn transition_reservation(
        &self,
        id: Uuid,
        transition: &StateTransition,
    ) -> DomainResult<Option<Reservation>>;
}

/// User profiles and reputation counters.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a fresh profile, or updates name and email of an existing one
    /// leaving its reputation untouched.
    async fn upsert_profile(&self, profile: &UserProfile) -> DomainResult<UserProfile>;

    async fn find_profile(&self, id: &str) -> DomainResult<Option<UserProfile>>;

    /// All profiles, newest first.
    async fn list_profiles(&self) -> DomainResult<Vec<UserProfile>>;

    /// Stores an already clamped rating.
    async fn set_stars(
        &self,
        id: &str,
        stars: i32,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<UserProfile>>;
}

/// Everything the booking services need from storage.
#[async_trait]
pub trait BookingStore: CourtStore + ReservationStore + UserStore {
    /// Connectivity check for readiness probes.
    async fn ping(&self) -> DomainResult<()>;
}

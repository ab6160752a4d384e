//! Reservation lifecycle: creation, admin decisions, cancellation and the
//! time-driven sweeps.
//!
//! ```text
//! Pending ──approve──▶ Approved ──no-show sweep──▶ NoShow
//!    │                  │  ▲
//!    ├─reject─▶ Rejected │  └─postpone (schedule changes, state kept)
//!    │                  └──admin cancel──▶ Cancelled
//!    ├─user cancel / expiry sweep──▶ Cancelled
//!    └─postpone──▶ Approved
//! ```
//!
//! Every transition is a compare-and-set on the stored state, so concurrent
//! callers cannot both move the same reservation. Penalties and reservation
//! counters are written together with the reservation they belong to.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::clock::Clock;
use crate::error::{DomainError, DomainResult};
use crate::models::reservation::{
    CreateReservationRequest, PostponeReservationRequest, ADMIN_CANCELLED_REASON,
    ADMIN_REJECTED_REASON, EXPIRED_REASON, NO_SHOW_REASON, USER_CANCELLED_REASON,
};
use crate::models::{Court, Reservation, ReservationState};
use crate::policy::BookingPolicy;
use crate::services::availability::{AvailabilityChecker, SlotAvailability};
use crate::services::reputation::ReputationLedger;
use crate::store::{BookingStore, ReservationFilter, Schedule, StateTransition};

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Candidates found by the query.
    pub examined: usize,
    pub transitioned: Vec<Uuid>,
    /// Candidates that another writer moved first.
    pub skipped: usize,
    /// Candidates that could not be processed; the sweep carried on.
    pub failed: Vec<Uuid>,
}

/// Both sweeps run together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummary {
    pub expired: SweepReport,
    pub no_shows: SweepReport,
}

#[derive(Clone)]
pub struct ReservationLifecycle {
    store: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
    availability: AvailabilityChecker,
    reputation: ReputationLedger,
}

impl ReservationLifecycle {
    pub fn new(
        store: Arc<dyn BookingStore>,
        clock: Arc<dyn Clock>,
        policy: BookingPolicy,
        availability: AvailabilityChecker,
        reputation: ReputationLedger,
    ) -> Self {
        Self {
            store,
            clock,
            policy,
            availability,
            reputation,
        }
    }

    /// Books a slot for `user_id` as a pending request.
    ///
    /// The court is read fresh so a disablement applied after the caller
    /// last looked is still honoured.
    pub async fn create(
        &self,
        user_id: &str,
        request: CreateReservationRequest,
    ) -> DomainResult<Reservation> {
        request.validate()?;
        let time = shared::validation::parse_time_of_day(&request.time)?;
        let now = self.clock.now();

        let court = self.find_court(request.court_id).await?;

        if request.party_size < court.minimum_party_size {
            return Err(DomainError::validation(format!(
                "{} requires at least {} players",
                court.name, court.minimum_party_size
            )));
        }

        if court.blocks_booking_at(now) {
            return Err(DomainError::Disabled(disabled_message(&court)));
        }

        if !self.policy.within_opening_hours(time) {
            return Err(DomainError::validation(self.policy.opening_hours_message()));
        }

        let date_time = self.policy.to_instant(request.date, time)?;
        if date_time <= now {
            return Err(DomainError::validation(
                "Reservations must be for a future date and time",
            ));
        }

        match self
            .availability
            .evaluate(&court, request.date, time, None)
            .await?
        {
            SlotAvailability::Available => {}
            SlotAvailability::CourtDisabled { .. } => {
                return Err(DomainError::Disabled(disabled_message(&court)));
            }
            SlotAvailability::OutsideOpeningHours => {
                return Err(DomainError::validation(self.policy.opening_hours_message()));
            }
            SlotAvailability::AlreadyBooked => {
                return Err(DomainError::Conflict(format!(
                    "{} is already booked on {} at {}",
                    court.name,
                    request.date,
                    time.format("%H:%M")
                )));
            }
        }

        let profile = self.reputation.get_profile(user_id).await?;

        let reservation = Reservation {
            id: Uuid::new_v4(),
            user_id: profile.id.clone(),
            user_name: profile.display_name.clone(),
            court_id: court.id,
            court_name: court.name.clone(),
            sport: court.sport,
            date: request.date,
            time,
            date_time,
            party_size: request.party_size,
            state: ReservationState::Pending,
            reason: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_reservation(&reservation).await?;

        info!(
            reservation_id = %reservation.id,
            court_id = %court.id,
            user_id = %user_id,
            date = %reservation.date,
            time = %reservation.time.format("%H:%M"),
            "Reservation created"
        );
        Ok(reservation)
    }

    /// `Pending -> Approved`. A slot already held by another approved
    /// reservation cannot be approved twice; the store enforces this.
    pub async fn approve(&self, id: Uuid) -> DomainResult<Reservation> {
        let current = self.get_reservation(id).await?;
        self.ensure_state(
            &current,
            &[ReservationState::Pending],
            ReservationState::Approved,
            "approved",
        )?;

        let transition = StateTransition::new(
            ReservationState::Pending,
            ReservationState::Approved,
            self.clock.now(),
        );
        self.apply(id, transition).await
    }

    /// `Pending -> Rejected`. Blank reasons fall back to a default.
    pub async fn reject(&self, id: Uuid, reason: Option<String>) -> DomainResult<Reservation> {
        let current = self.get_reservation(id).await?;
        self.ensure_state(
            &current,
            &[ReservationState::Pending],
            ReservationState::Rejected,
            "rejected",
        )?;

        let transition = StateTransition::new(
            ReservationState::Pending,
            ReservationState::Rejected,
            self.clock.now(),
        )
        .with_reason(reason_or(reason, ADMIN_REJECTED_REASON));
        self.apply(id, transition).await
    }

    /// Moves a pending or approved reservation to a new slot and approves it.
    pub async fn postpone(
        &self,
        id: Uuid,
        request: PostponeReservationRequest,
    ) -> DomainResult<Reservation> {
        request.validate()?;
        let time = shared::validation::parse_time_of_day(&request.time)?;

        let current = self.get_reservation(id).await?;
        self.ensure_state(
            &current,
            &[ReservationState::Pending, ReservationState::Approved],
            ReservationState::Approved,
            "postponed",
        )?;

        if !self.policy.within_opening_hours(time) {
            return Err(DomainError::validation(self.policy.opening_hours_message()));
        }

        let now = self.clock.now();
        let date_time = self.policy.to_instant(request.date, time)?;
        if date_time <= now {
            return Err(DomainError::validation(
                "A reservation cannot be postponed into the past",
            ));
        }

        let transition = StateTransition::new(current.state, ReservationState::Approved, now)
            .with_schedule(Schedule {
                date: request.date,
                time,
                date_time,
            });
        self.apply(id, transition).await
    }

    /// `Pending -> Cancelled` by the owner; counts as a penalty.
    ///
    /// Reservations owned by someone else are reported as not found.
    pub async fn cancel_by_user(&self, id: Uuid, user_id: &str) -> DomainResult<Reservation> {
        let current = self.get_reservation_for_user(id, user_id).await?;
        if current.state != ReservationState::Pending {
            return Err(DomainError::InvalidState(format!(
                "Only pending reservations can be cancelled by their owner; this one is {}",
                current.state
            )));
        }

        let transition = StateTransition::new(
            ReservationState::Pending,
            ReservationState::Cancelled,
            self.clock.now(),
        )
        .with_reason(USER_CANCELLED_REASON)
        .penalizing_owner();
        let cancelled = self.apply(id, transition).await?;

        info!(reservation_id = %id, user_id = %user_id, "User penalized for cancelling");
        Ok(cancelled)
    }

    /// `Approved -> Cancelled` by an administrator; no penalty.
    pub async fn cancel_by_admin(
        &self,
        id: Uuid,
        reason: Option<String>,
    ) -> DomainResult<Reservation> {
        let current = self.get_reservation(id).await?;
        self.ensure_state(
            &current,
            &[ReservationState::Approved],
            ReservationState::Cancelled,
            "cancelled",
        )?;

        let transition = StateTransition::new(
            ReservationState::Approved,
            ReservationState::Cancelled,
            self.clock.now(),
        )
        .with_reason(reason_or(reason, ADMIN_CANCELLED_REASON));
        self.apply(id, transition).await
    }

    /// Cancels every pending reservation whose start has passed.
    ///
    /// Expiry carries no penalty. Per-record failures are logged and skipped.
    pub async fn sweep_expired(&self) -> DomainResult<SweepReport> {
        let now = self.clock.now();
        let candidates = self
            .store
            .list_reservations(&ReservationFilter::due(ReservationState::Pending, now))
            .await?;

        let mut report = SweepReport {
            examined: candidates.len(),
            ..Default::default()
        };
        for reservation in candidates {
            let transition =
                StateTransition::new(ReservationState::Pending, ReservationState::Cancelled, now)
                    .with_reason(EXPIRED_REASON);
            match self.store.transition_reservation(reservation.id, &transition).await {
                Ok(Some(_)) => {
                    info!(reservation_id = %reservation.id, "Pending reservation expired");
                    report.transitioned.push(reservation.id);
                }
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    warn!(reservation_id = %reservation.id, error = %e, "Skipping reservation in expiry sweep");
                    report.failed.push(reservation.id);
                }
            }
        }

        Ok(report)
    }

    /// Marks approved reservations more than the grace period past their
    /// start as no-shows and penalizes their owners once each.
    pub async fn sweep_no_shows(&self) -> DomainResult<SweepReport> {
        let now = self.clock.now();
        let threshold = now - self.policy.no_show_grace();
        let candidates = self
            .store
            .list_reservations(&ReservationFilter::due(ReservationState::Approved, threshold))
            .await?;

        let mut report = SweepReport {
            examined: candidates.len(),
            ..Default::default()
        };
        for reservation in candidates {
            match self.mark_no_show(&reservation).await {
                Ok(true) => report.transitioned.push(reservation.id),
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    warn!(reservation_id = %reservation.id, error = %e, "Skipping reservation in no-show sweep");
                    report.failed.push(reservation.id);
                }
            }
        }

        Ok(report)
    }

    /// Runs the expiry sweep, then the no-show sweep.
    pub async fn sweep_all(&self) -> DomainResult<SweepSummary> {
        Ok(SweepSummary {
            expired: self.sweep_expired().await?,
            no_shows: self.sweep_no_shows().await?,
        })
    }

    /// Applies the no-show rule to one reservation. Returns whether it
    /// transitioned, together with its current record.
    pub async fn check_no_show(&self, id: Uuid) -> DomainResult<(bool, Reservation)> {
        let current = self.get_reservation(id).await?;
        let threshold = self.clock.now() - self.policy.no_show_grace();
        if current.state != ReservationState::Approved || current.date_time >= threshold {
            return Ok((false, current));
        }

        let transitioned = self.mark_no_show(&current).await?;
        let latest = self.get_reservation(id).await?;
        Ok((transitioned, latest))
    }

    pub async fn get_reservation(&self, id: Uuid) -> DomainResult<Reservation> {
        self.store
            .find_reservation(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Reservation {} not found", id)))
    }

    /// Same as [`Self::get_reservation`] but hides other users' reservations.
    pub async fn get_reservation_for_user(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> DomainResult<Reservation> {
        match self.store.find_reservation(id).await? {
            Some(reservation) if reservation.user_id == user_id => Ok(reservation),
            _ => Err(DomainError::not_found(format!(
                "Reservation {} not found",
                id
            ))),
        }
    }

    /// The user's reservations, most recent slot first.
    pub async fn list_user_reservations(&self, user_id: &str) -> DomainResult<Vec<Reservation>> {
        let mut reservations = self
            .store
            .list_reservations(&ReservationFilter::for_user(user_id))
            .await?;
        reservations.reverse();
        Ok(reservations)
    }

    /// All reservations by slot, optionally restricted to one state.
    pub async fn list_reservations(
        &self,
        state: Option<ReservationState>,
    ) -> DomainResult<Vec<Reservation>> {
        let filter = state.map(ReservationFilter::in_state).unwrap_or_default();
        self.store.list_reservations(&filter).await
    }

    pub async fn list_pending(&self) -> DomainResult<Vec<Reservation>> {
        self.list_reservations(Some(ReservationState::Pending)).await
    }

    async fn find_court(&self, id: Uuid) -> DomainResult<Court> {
        self.store
            .find_court(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Court {} not found", id)))
    }

    async fn mark_no_show(&self, reservation: &Reservation) -> DomainResult<bool> {
        let transition = StateTransition::new(
            ReservationState::Approved,
            ReservationState::NoShow,
            self.clock.now(),
        )
        .with_reason(NO_SHOW_REASON)
        .penalizing_owner();

        if self
            .store
            .transition_reservation(reservation.id, &transition)
            .await?
            .is_none()
        {
            return Ok(false);
        }

        info!(
            reservation_id = %reservation.id,
            user_id = %reservation.user_id,
            "Reservation marked as no-show, user penalized"
        );
        Ok(true)
    }

    /// The move must be an edge of the state machine, and `allowed` narrows
    /// which source states this action may start from.
    fn ensure_state(
        &self,
        reservation: &Reservation,
        allowed: &[ReservationState],
        to: ReservationState,
        action: &str,
    ) -> DomainResult<()> {
        let state = reservation.state;
        if allowed.contains(&state) && state.can_transition_to(to) {
            Ok(())
        } else if state.is_terminal() {
            Err(DomainError::InvalidState(format!(
                "Reservation is {} and can no longer change",
                state
            )))
        } else {
            Err(DomainError::InvalidState(format!(
                "Reservation is {} and cannot be {}",
                state, action
            )))
        }
    }

    /// Runs the compare-and-set. When it loses a race the fresh state is
    /// reported instead of overwriting it.
    async fn apply(&self, id: Uuid, transition: StateTransition) -> DomainResult<Reservation> {
        match self.store.transition_reservation(id, &transition).await? {
            Some(updated) => {
                info!(
                    reservation_id = %id,
                    from = %transition.from,
                    to = %transition.to,
                    "Reservation transitioned"
                );
                Ok(updated)
            }
            None => {
                let latest = self.get_reservation(id).await?;
                Err(DomainError::InvalidState(format!(
                    "Reservation changed concurrently and is now {}",
                    latest.state
                )))
            }
        }
    }
}

fn reason_or(reason: Option<String>, default: &str) -> String {
    reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn disabled_message(court: &Court) -> String {
    match court.disabled_until {
        Some(until) => format!(
            "{} is disabled until {}",
            court.name,
            until.format("%Y-%m-%d %H:%M UTC")
        ),
        None => format!("{} is disabled until further notice", court.name),
    }
}

//! In-memory booking store for tests and local development.

#[cfg(test)]
use std::collections::HashSet;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    slot_taken, BookingStore, CourtStore, ReservationFilter, ReservationStore, StateTransition,
    UserStore,
};
use crate::error::{DomainError, DomainResult};
use crate::models::user::clamp_stars;
use crate::models::{Court, DisablementWindow, Reservation, ReservationState, UserProfile};

#[derive(Debug, Default)]
struct State {
    courts: HashMap<Uuid, Court>,
    reservations: HashMap<Uuid, Reservation>,
    profiles: HashMap<String, UserProfile>,
    #[cfg(test)]
    faults: Faults,
}

/// Storage failures injected by tests.
#[cfg(test)]
#[derive(Debug, Default)]
struct Faults {
    transitions: HashSet<Uuid>,
    /// One-shot: cleared once the failure fires.
    penalties: HashSet<String>,
}

impl State {
    fn approved_on_slot(
        &self,
        court_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        excluding: Option<Uuid>,
    ) -> bool {
        self.reservations.values().any(|r| {
            r.court_id == court_id
                && r.date == date
                && r.time == time
                && r.state == ReservationState::Approved
                && Some(r.id) != excluding
        })
    }

    #[cfg(test)]
    fn check_transition_fault(&mut self, id: Uuid) -> DomainResult<()> {
        if self.faults.transitions.contains(&id) {
            return Err(DomainError::storage(format!(
                "reservation {} cannot be updated",
                id
            )));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_transition_fault(&mut self, _id: Uuid) -> DomainResult<()> {
        Ok(())
    }

    #[cfg(test)]
    fn check_penalty_fault(&mut self, user_id: &str) -> DomainResult<()> {
        if self.faults.penalties.remove(user_id) {
            return Err(DomainError::storage(format!(
                "penalty for {} could not be recorded",
                user_id
            )));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_penalty_fault(&mut self, _user_id: &str) -> DomainResult<()> {
        Ok(())
    }
}

fn unknown_owner(user_id: &str) -> DomainError {
    DomainError::not_found(format!("User {} not found", user_id))
}

/// A [`BookingStore`] backed by hash maps behind a single lock.
///
/// Each trait call holds the lock for its whole duration, which gives the
/// same atomicity as the transactions of the SQL store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every transition of the given reservation fail.
    #[cfg(test)]
    pub(crate) async fn fail_transitions_for(&self, id: Uuid) {
        self.state.write().await.faults.transitions.insert(id);
    }

    /// Makes the next penalty recorded for `user_id` fail.
    #[cfg(test)]
    pub(crate) async fn fail_next_penalty_for(&self, user_id: &str) {
        self.state
            .write()
            .await
            .faults
            .penalties
            .insert(user_id.to_string());
    }
}

#[async_trait]
impl CourtStore for InMemoryStore {
    async fn insert_court_if_absent(&self, court: &Court) -> DomainResult<bool> {
        let mut state = self.state.write().await;
        if state.courts.values().any(|c| c.name == court.name) {
            return Ok(false);
        }
        state.courts.insert(court.id, court.clone());
        Ok(true)
    }

    async fn find_court(&self, id: Uuid) -> DomainResult<Option<Court>> {
        Ok(self.state.read().await.courts.get(&id).cloned())
    }

    async fn list_courts(&self) -> DomainResult<Vec<Court>> {
        let state = self.state.read().await;
        let mut courts: Vec<Court> = state.courts.values().cloned().collect();
        courts.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(courts)
    }

    async fn save_disablement(
        &self,
        id: Uuid,
        window: Option<DisablementWindow>,
    ) -> DomainResult<Option<Court>> {
        let mut state = self.state.write().await;
        Ok(state.courts.get_mut(&id).map(|court| {
            court.apply_disablement(window);
            court.clone()
        }))
    }
}

#[async_trait]
impl ReservationStore for InMemoryStore {
    async fn insert_reservation(&self, reservation: &Reservation) -> DomainResult<()> {
        let mut state = self.state.write().await;
        if state.reservations.contains_key(&reservation.id) {
            return Err(DomainError::Conflict(format!(
                "Reservation {} already exists",
                reservation.id
            )));
        }
        let profile = state
            .profiles
            .get_mut(&reservation.user_id)
            .ok_or_else(|| unknown_owner(&reservation.user_id))?;
        profile.total_reservations += 1;
        profile.updated_at = reservation.created_at;

        state
            .reservations
            .insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn find_reservation(&self, id: Uuid) -> DomainResult<Option<Reservation>> {
        Ok(self.state.read().await.reservations.get(&id).cloned())
    }

    async fn list_reservations(
        &self,
        filter: &ReservationFilter,
    ) -> DomainResult<Vec<Reservation>> {
        let state = self.state.read().await;
        let mut reservations: Vec<Reservation> = state
            .reservations
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        reservations.sort_by(|a, b| {
            a.date_time
                .cmp(&b.date_time)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(reservations)
    }

    async fn approved_exists_for_slot(
        &self,
        court_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        excluding: Option<Uuid>,
    ) -> DomainResult<bool> {
        let state = self.state.read().await;
        Ok(state.approved_on_slot(court_id, date, time, excluding))
    }

    async fn transition_reservation(
        &self,
        id: Uuid,
        transition: &StateTransition,
    ) -> DomainResult<Option<Reservation>> {
        let mut state = self.state.write().await;
        state.check_transition_fault(id)?;

        let mut updated = match state.reservations.get(&id) {
            Some(current) if current.state == transition.from => current.clone(),
            _ => return Ok(None),
        };
        transition.apply(&mut updated);

        if updated.state == ReservationState::Approved
            && state.approved_on_slot(updated.court_id, updated.date, updated.time, Some(id))
        {
            return Err(slot_taken());
        }

        // Everything that can fail runs before the first mutation.
        if transition.penalize_owner {
            state.check_penalty_fault(&updated.user_id)?;
            let penalized = state
                .profiles
                .get(&updated.user_id)
                .ok_or_else(|| unknown_owner(&updated.user_id))?
                .clone()
                .penalized(transition.at);
            state.profiles.insert(penalized.id.clone(), penalized);
        }

        state.reservations.insert(id, updated.clone());
        Ok(Some(updated))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn upsert_profile(&self, profile: &UserProfile) -> DomainResult<UserProfile> {
        let mut state = self.state.write().await;
        let stored = state
            .profiles
            .entry(profile.id.clone())
            .and_modify(|existing| {
                existing.display_name = profile.display_name.clone();
                existing.email = profile.email.clone();
                existing.updated_at = profile.updated_at;
            })
            .or_insert_with(|| profile.clone());
        Ok(stored.clone())
    }

    async fn find_profile(&self, id: &str) -> DomainResult<Option<UserProfile>> {
        Ok(self.state.read().await.profiles.get(id).cloned())
    }

    async fn list_profiles(&self) -> DomainResult<Vec<UserProfile>> {
        let state = self.state.read().await;
        let mut profiles: Vec<UserProfile> = state.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(profiles)
    }

    async fn set_stars(
        &self,
        id: &str,
        stars: i32,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<UserProfile>> {
        let mut state = self.state.write().await;
        Ok(state.profiles.get_mut(id).map(|profile| {
            profile.stars = clamp_stars(stars);
            profile.updated_at = at;
            profile.clone()
        }))
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}

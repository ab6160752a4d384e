//! Admin dashboard statistics.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};

use crate::clock::Clock;
use crate::error::DomainResult;
use crate::models::user::DEFAULT_STARS;
use crate::models::{
    Court, Reservation, ReservationState, Sport, SportStats, SystemStats, UserProfile,
};
use crate::policy::BookingPolicy;
use crate::store::{BookingStore, ReservationFilter};

#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
}

impl StatsService {
    pub fn new(store: Arc<dyn BookingStore>, clock: Arc<dyn Clock>, policy: BookingPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub async fn system_stats(&self) -> DomainResult<SystemStats> {
        let courts = self.store.list_courts().await?;
        let reservations = self
            .store
            .list_reservations(&ReservationFilter::default())
            .await?;
        let profiles = self.store.list_profiles().await?;

        Ok(compute_system_stats(
            &courts,
            &reservations,
            &profiles,
            self.clock.now(),
            &self.policy,
        ))
    }
}

/// Aggregates counters; "today" and "this month" use the venue's local date.
pub fn compute_system_stats(
    courts: &[Court],
    reservations: &[Reservation],
    profiles: &[UserProfile],
    now: DateTime<Utc>,
    policy: &BookingPolicy,
) -> SystemStats {
    let today = policy.today(now);
    let count_state = |state: ReservationState| {
        reservations.iter().filter(|r| r.state == state).count() as i64
    };

    let average_rating = if profiles.is_empty() {
        f64::from(DEFAULT_STARS)
    } else {
        let sum: i64 = profiles.iter().map(|p| i64::from(p.stars)).sum();
        let mean = sum as f64 / profiles.len() as f64;
        (mean * 10.0).round() / 10.0
    };

    let by_sport = Sport::ALL
        .iter()
        .map(|&sport| {
            let of_sport: Vec<&Reservation> =
                reservations.iter().filter(|r| r.sport == sport).collect();
            let count = |state: ReservationState| {
                of_sport.iter().filter(|r| r.state == state).count() as i64
            };
            SportStats {
                sport,
                total: of_sport.len() as i64,
                approved: count(ReservationState::Approved),
                pending: count(ReservationState::Pending),
                rejected: count(ReservationState::Rejected),
            }
        })
        .collect();

    let disabled_courts = courts.iter().filter(|c| c.disabled).count() as i64;

    SystemStats {
        total_reservations: reservations.len() as i64,
        today_reservations: reservations.iter().filter(|r| r.date == today).count() as i64,
        month_reservations: reservations
            .iter()
            .filter(|r| r.date.year() == today.year() && r.date.month() == today.month())
            .count() as i64,
        pending: count_state(ReservationState::Pending),
        approved: count_state(ReservationState::Approved),
        rejected: count_state(ReservationState::Rejected),
        cancelled: count_state(ReservationState::Cancelled),
        no_shows: count_state(ReservationState::NoShow),
        total_users: profiles.len() as i64,
        active_users: profiles.iter().filter(|p| p.total_reservations > 0).count() as i64,
        average_rating,
        total_courts: courts.len() as i64,
        active_courts: courts.len() as i64 - disabled_courts,
        disabled_courts,
        by_sport,
    }
}

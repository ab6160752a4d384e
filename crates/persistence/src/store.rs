//! PostgreSQL implementation of the domain store traits.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domain::models::{Court, DisablementWindow, Reservation, UserProfile};
use domain::store::{
    slot_taken, BookingStore, CourtStore, ReservationFilter, ReservationStore, StateTransition,
    UserStore,
};
use domain::{DomainError, DomainResult};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::db;
use crate::entities::{CourtEntity, ReservationEntity};
use crate::repositories::{
    CourtRepository, ReservationQuery, ReservationRepository, ReservationUpdate,
    UserProfileRepository,
};

/// Booking store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
    courts: CourtRepository,
    reservations: ReservationRepository,
    profiles: UserProfileRepository,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            courts: CourtRepository::new(pool.clone()),
            reservations: ReservationRepository::new(pool.clone()),
            profiles: UserProfileRepository::new(pool.clone()),
            pool,
        }
    }
}

/// PostgreSQL error code for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

fn transition_error(err: sqlx::Error) -> DomainError {
    // The only unique index a status update can hit is the approved-slot one.
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return slot_taken();
        }
    }
    DomainError::storage(err)
}

fn court_from(entity: CourtEntity) -> DomainResult<Court> {
    Court::try_from(entity).map_err(DomainError::storage)
}

fn reservation_from(entity: ReservationEntity) -> DomainResult<Reservation> {
    Reservation::try_from(entity).map_err(DomainError::storage)
}

#[async_trait]
impl CourtStore for PgBookingStore {
    async fn insert_court_if_absent(&self, court: &Court) -> DomainResult<bool> {
        self.courts
            .insert_if_absent(court)
            .await
            .map_err(DomainError::storage)
    }

    async fn find_court(&self, id: Uuid) -> DomainResult<Option<Court>> {
        self.courts
            .find_by_id(id)
            .await
            .map_err(DomainError::storage)?
            .map(court_from)
            .transpose()
    }

    async fn list_courts(&self) -> DomainResult<Vec<Court>> {
        let rows = self.courts.list_all().await.map_err(DomainError::storage)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                court_from(row)
                    .map_err(|e| warn!(court_id = %id, error = %e, "Skipping unreadable court row"))
                    .ok()
            })
            .collect())
    }

    async fn save_disablement(
        &self,
        id: Uuid,
        window: Option<DisablementWindow>,
    ) -> DomainResult<Option<Court>> {
        let (disabled, at, until) = match window {
            Some(w) => (true, Some(w.disabled_at), w.disabled_until),
            None => (false, None, None),
        };
        self.courts
            .set_disablement(id, disabled, at, until)
            .await
            .map_err(DomainError::storage)?
            .map(court_from)
            .transpose()
    }
}

#[async_trait]
impl ReservationStore for PgBookingStore {
    async fn insert_reservation(&self, reservation: &Reservation) -> DomainResult<()> {
        let inserted = self
            .reservations
            .insert(reservation)
            .await
            .map_err(DomainError::storage)?;
        if !inserted {
            return Err(DomainError::not_found(format!(
                "User {} not found",
                reservation.user_id
            )));
        }
        Ok(())
    }

    async fn find_reservation(&self, id: Uuid) -> DomainResult<Option<Reservation>> {
        self.reservations
            .find_by_id(id)
            .await
            .map_err(DomainError::storage)?
            .map(reservation_from)
            .transpose()
    }

    async fn list_reservations(&self, filter: &ReservationFilter) -> DomainResult<Vec<Reservation>> {
        let query = ReservationQuery {
            user_id: filter.user_id.as_deref(),
            court_id: filter.court_id,
            status: filter.state.map(|s| s.as_str()),
            due_before: filter.due_before,
        };
        let rows = self
            .reservations
            .list(&query)
            .await
            .map_err(DomainError::storage)?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                reservation_from(row)
                    .map_err(|e| {
                        warn!(reservation_id = %id, error = %e, "Skipping unreadable reservation row")
                    })
                    .ok()
            })
            .collect())
    }

    async fn approved_exists_for_slot(
        &self,
        court_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        excluding: Option<Uuid>,
    ) -> DomainResult<bool> {
        self.reservations
            .approved_exists_for_slot(court_id, date, time, excluding)
            .await
            .map_err(DomainError::storage)
    }

    async fn transition_reservation(
        &self,
        id: Uuid,
        transition: &StateTransition,
    ) -> DomainResult<Option<Reservation>> {
        let schedule = transition.reschedule;
        let update = ReservationUpdate {
            from_status: transition.from.as_str(),
            to_status: transition.to.as_str(),
            reason: transition.reason.as_deref(),
            date: schedule.map(|s| s.date),
            time: schedule.map(|s| s.time),
            date_time: schedule.map(|s| s.date_time),
            updated_at: transition.at,
            penalize_owner: transition.penalize_owner,
        };
        self.reservations
            .transition(id, &update)
            .await
            .map_err(transition_error)?
            .map(reservation_from)
            .transpose()
    }
}

#[async_trait]
impl UserStore for PgBookingStore {
    async fn upsert_profile(&self, profile: &UserProfile) -> DomainResult<UserProfile> {
        self.profiles
            .upsert(profile)
            .await
            .map(UserProfile::from)
            .map_err(DomainError::storage)
    }

    async fn find_profile(&self, id: &str) -> DomainResult<Option<UserProfile>> {
        self.profiles
            .find_by_id(id)
            .await
            .map(|row| row.map(UserProfile::from))
            .map_err(DomainError::storage)
    }

    async fn list_profiles(&self) -> DomainResult<Vec<UserProfile>> {
        self.profiles
            .list_all()
            .await
            .map(|rows| rows.into_iter().map(UserProfile::from).collect())
            .map_err(DomainError::storage)
    }

    async fn set_stars(
        &self,
        id: &str,
        stars: i32,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<UserProfile>> {
        self.profiles
            .set_stars(id, stars, at)
            .await
            .map(|row| row.map(UserProfile::from))
            .map_err(DomainError::storage)
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn ping(&self) -> DomainResult<()> {
        db::ping(&self.pool).await.map_err(DomainError::storage)
    }
}

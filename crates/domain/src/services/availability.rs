//! Availability checker: decides whether a (court, date, time) slot is bookable.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{DomainError, DomainResult};
use crate::models::Court;
use crate::policy::BookingPolicy;
use crate::store::BookingStore;

/// Why a slot is or is not bookable right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotAvailability {
    Available,
    OutsideOpeningHours,
    CourtDisabled {
        #[serde(rename = "disabledUntil", skip_serializing_if = "Option::is_none")]
        until: Option<DateTime<Utc>>,
    },
    AlreadyBooked,
}

impl SlotAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, SlotAvailability::Available)
    }
}

#[derive(Clone)]
pub struct AvailabilityChecker {
    store: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
}

impl AvailabilityChecker {
    pub fn new(store: Arc<dyn BookingStore>, clock: Arc<dyn Clock>, policy: BookingPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    /// Evaluates the slot at the current instant.
    ///
    /// Checks run in order and stop at the first failure: opening hours,
    /// court disablement, then approved reservations on the same slot.
    /// Pending reservations never block.
    pub async fn check_slot(
        &self,
        court_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> DomainResult<SlotAvailability> {
        let court = self
            .store
            .find_court(court_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Court {} not found", court_id)))?;
        self.evaluate(&court, date, time, None).await
    }

    pub async fn is_available(
        &self,
        court_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> DomainResult<bool> {
        Ok(self.check_slot(court_id, date, time).await?.is_available())
    }

    /// Evaluates an already loaded court. `excluding` ignores one
    /// reservation when looking for conflicts.
    pub(crate) async fn evaluate(
        &self,
        court: &Court,
        date: NaiveDate,
        time: NaiveTime,
        excluding: Option<Uuid>,
    ) -> DomainResult<SlotAvailability> {
        if !self.policy.within_opening_hours(time) {
            return Ok(SlotAvailability::OutsideOpeningHours);
        }

        if court.blocks_booking_at(self.clock.now()) {
            return Ok(SlotAvailability::CourtDisabled {
                until: court.disabled_until,
            });
        }

        if self
            .store
            .approved_exists_for_slot(court.id, date, time, excluding)
            .await?
        {
            return Ok(SlotAvailability::AlreadyBooked);
        }

        Ok(SlotAvailability::Available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::{DisablementWindow, Reservation, ReservationState, Sport, UserProfile};
    use crate::store::{CourtStore, InMemoryStore, ReservationStore, UserStore};
    use chrono::{Duration, TimeZone};

    struct Fixture {
        store: Arc<InMemoryStore>,
        clock: Arc<ManualClock>,
        checker: AvailabilityChecker,
        court: Court,
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 2).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(start()));
        let court = Court::new("Court 1 - Basketball", Sport::Basketball, 4, 1);
        store.insert_court_if_absent(&court).await.unwrap();
        store
            .upsert_profile(&UserProfile::new("user-1", "Ana", None, start()))
            .await
            .unwrap();
        let checker = AvailabilityChecker::new(
            store.clone(),
            clock.clone(),
            BookingPolicy::default(),
        );
        Fixture {
            store,
            clock,
            checker,
            court,
        }
    }

    async fn add_reservation(fx: &Fixture, state: ReservationState, time: NaiveTime) {
        let reservation = Reservation {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            user_name: "Ana".to_string(),
            court_id: fx.court.id,
            court_name: fx.court.name.clone(),
            sport: fx.court.sport,
            date: date(),
            time,
            date_time: BookingPolicy::default().to_instant(date(), time).unwrap(),
            party_size: 4,
            state,
            reason: None,
            created_at: start(),
            updated_at: start(),
        };
        fx.store.insert_reservation(&reservation).await.unwrap();
    }

    #[tokio::test]
    async fn test_opening_hours_boundaries() {
        let fx = fixture().await;
        let check = |time| fx.checker.is_available(fx.court.id, date(), time);

        assert!(!check(t(4, 59)).await.unwrap());
        assert!(check(t(5, 0)).await.unwrap());
        assert!(check(t(21, 59)).await.unwrap());
        assert!(!check(t(22, 0)).await.unwrap());
    }

    #[tokio::test]
    async fn test_outside_hours_wins_over_other_state() {
        let fx = fixture().await;
        fx.store
            .save_disablement(fx.court.id, Some(DisablementWindow::permanent(start())))
            .await
            .unwrap();
        for hour in [0, 3, 4, 22, 23] {
            assert_eq!(
                fx.checker
                    .check_slot(fx.court.id, date(), t(hour, 30))
                    .await
                    .unwrap(),
                SlotAvailability::OutsideOpeningHours
            );
        }
    }

    #[tokio::test]
    async fn test_permanently_disabled_court() {
        let fx = fixture().await;
        fx.store
            .save_disablement(fx.court.id, Some(DisablementWindow::permanent(start())))
            .await
            .unwrap();

        assert_eq!(
            fx.checker.check_slot(fx.court.id, date(), t(10, 0)).await.unwrap(),
            SlotAvailability::CourtDisabled { until: None }
        );
        fx.clock.advance(Duration::days(30));
        assert!(!fx.checker.is_available(fx.court.id, date(), t(10, 0)).await.unwrap());
    }

    #[tokio::test]
    async fn test_temporary_disablement_expires_without_enabling() {
        let fx = fixture().await;
        let until = start() + Duration::hours(1);
        fx.store
            .save_disablement(
                fx.court.id,
                Some(DisablementWindow::new(start(), Some(until)).unwrap()),
            )
            .await
            .unwrap();

        assert!(!fx.checker.is_available(fx.court.id, date(), t(10, 0)).await.unwrap());

        fx.clock.set(until + Duration::seconds(1));
        assert!(fx.checker.is_available(fx.court.id, date(), t(10, 0)).await.unwrap());

        let court = fx.store.find_court(fx.court.id).await.unwrap().unwrap();
        assert!(court.disabled);
    }

    #[tokio::test]
    async fn test_pending_does_not_block_but_approved_does() {
        let fx = fixture().await;
        add_reservation(&fx, ReservationState::Pending, t(10, 0)).await;
        add_reservation(&fx, ReservationState::Pending, t(10, 0)).await;
        assert!(fx.checker.is_available(fx.court.id, date(), t(10, 0)).await.unwrap());

        add_reservation(&fx, ReservationState::Approved, t(10, 0)).await;
        assert_eq!(
            fx.checker.check_slot(fx.court.id, date(), t(10, 0)).await.unwrap(),
            SlotAvailability::AlreadyBooked
        );
        assert!(fx.checker.is_available(fx.court.id, date(), t(10, 1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_terminal_reservations_do_not_block() {
        let fx = fixture().await;
        add_reservation(&fx, ReservationState::Rejected, t(11, 0)).await;
        add_reservation(&fx, ReservationState::Cancelled, t(11, 0)).await;
        add_reservation(&fx, ReservationState::NoShow, t(11, 0)).await;
        assert!(fx.checker.is_available(fx.court.id, date(), t(11, 0)).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_court() {
        let fx = fixture().await;
        let result = fx.checker.is_available(Uuid::new_v4(), date(), t(10, 0)).await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[test]
    fn test_availability_serialization() {
        let json = serde_json::to_value(SlotAvailability::CourtDisabled { until: None }).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "court_disabled" }));
        let json = serde_json::to_value(SlotAvailability::Available).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "available" }));
    }
}

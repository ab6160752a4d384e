//! Background job that expires stale pending reservations and marks no-shows.

use domain::services::ReservationLifecycle;
use std::time::Duration;
use tracing::{info, warn};

use super::scheduler::Job;
use crate::middleware::metrics::record_sweep;

/// Runs both reservation sweeps on a fixed interval.
///
/// A failed record does not abort its sweep; it is reported and retried on
/// the next run.
pub struct ReservationSweepJob {
    lifecycle: ReservationLifecycle,
    interval: Duration,
}

impl ReservationSweepJob {
    pub fn new(lifecycle: ReservationLifecycle, interval: Duration) -> Self {
        Self {
            lifecycle,
            interval,
        }
    }
}

#[async_trait::async_trait]
impl Job for ReservationSweepJob {
    fn name(&self) -> &'static str {
        "reservation_sweep"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn execute(&self) -> Result<(), String> {
        let summary = self
            .lifecycle
            .sweep_all()
            .await
            .map_err(|e| e.to_string())?;

        record_sweep("expired", &summary.expired);
        record_sweep("no_show", &summary.no_shows);

        let failed = summary.expired.failed.len() + summary.no_shows.failed.len();
        if failed > 0 {
            warn!(failed, "Some reservations could not be swept");
        }
        if !summary.expired.transitioned.is_empty() || !summary.no_shows.transitioned.is_empty() {
            info!(
                expired = summary.expired.transitioned.len(),
                no_shows = summary.no_shows.transitioned.len(),
                "Reservation sweep applied"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
    use domain::models::{Court, Reservation, ReservationState, Sport, UserProfile};
    use domain::store::{CourtStore, ReservationStore, UserStore};
    use domain::{BookingPolicy, BookingServices, InMemoryStore, ManualClock};
    use std::sync::Arc;
    use uuid::Uuid;

    fn reservation(
        court: &Court,
        user_id: &str,
        state: ReservationState,
        hour: u32,
    ) -> Reservation {
        let date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap();
        let created = Utc.with_ymd_and_hms(2026, 5, 30, 12, 0, 0).unwrap();
        Reservation {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            user_name: "Ana".to_string(),
            court_id: court.id,
            court_name: court.name.clone(),
            sport: court.sport,
            date,
            time,
            date_time: date.and_time(time).and_utc(),
            party_size: 4,
            state,
            reason: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[tokio::test]
    async fn test_sweep_job_transitions_due_reservations() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(now));

        let court = Court::new("Court 1 - Basketball", Sport::Basketball, 4, 1);
        store.insert_court_if_absent(&court).await.unwrap();
        store
            .upsert_profile(&UserProfile::new("user-1", "Ana", None, now))
            .await
            .unwrap();

        let stale = reservation(&court, "user-1", ReservationState::Pending, 9);
        let missed = reservation(&court, "user-1", ReservationState::Approved, 10);
        store.insert_reservation(&stale).await.unwrap();
        store.insert_reservation(&missed).await.unwrap();

        let services = BookingServices::new(store.clone(), clock, BookingPolicy::default());
        let job = ReservationSweepJob::new(services.lifecycle.clone(), Duration::from_secs(60));
        assert_eq!(job.name(), "reservation_sweep");
        assert_eq!(job.interval(), Duration::from_secs(60));

        job.execute().await.unwrap();

        let stale = store.find_reservation(stale.id).await.unwrap().unwrap();
        assert_eq!(stale.state, ReservationState::Cancelled);
        let missed = store.find_reservation(missed.id).await.unwrap().unwrap();
        assert_eq!(missed.state, ReservationState::NoShow);

        let profile = store.find_profile("user-1").await.unwrap().unwrap();
        assert_eq!(profile.stars, 4);
        assert_eq!(profile.no_show_count, 1);
    }
}

//! Disablement scheduler: turns admin intent into a concrete window.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{DomainError, DomainResult};
use crate::models::{Court, DisablementRequest, DisablementWindow, UntilDateSpan};
use crate::policy::BookingPolicy;
use crate::services::court_registry::CourtRegistry;

#[derive(Clone)]
pub struct DisablementScheduler {
    registry: CourtRegistry,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
}

impl DisablementScheduler {
    pub fn new(registry: CourtRegistry, clock: Arc<dyn Clock>, policy: BookingPolicy) -> Self {
        Self {
            registry,
            clock,
            policy,
        }
    }

    pub async fn disable_court(
        &self,
        court_id: Uuid,
        request: &DisablementRequest,
    ) -> DomainResult<Court> {
        let window = self.resolve(request, self.clock.now())?;
        info!(court_id = %court_id, mode = request.mode(), "Disabling court");
        self.registry.set_disabled(court_id, window).await
    }

    pub async fn enable_court(&self, court_id: Uuid) -> DomainResult<Court> {
        self.registry.set_enabled(court_id).await
    }

    /// Computes the window a request describes, relative to `now`.
    pub fn resolve(
        &self,
        request: &DisablementRequest,
        now: DateTime<Utc>,
    ) -> DomainResult<DisablementWindow> {
        match request {
            DisablementRequest::Permanent => Ok(DisablementWindow::permanent(now)),
            DisablementRequest::RestOfToday => {
                DisablementWindow::new(now, Some(self.policy.next_local_midnight(now)?))
            }
            DisablementRequest::Duration {
                minutes,
                start_time,
            } => {
                let minutes = required_minutes(*minutes)?;
                let start = self.start_on(self.policy.today(now), start_time.as_deref(), now)?;
                DisablementWindow::new(start, Some(start + minutes))
            }
            DisablementRequest::UntilDate { date, span } => {
                let date = date.ok_or_else(|| {
                    DomainError::validation("A target date is required for this mode")
                })?;
                if date < self.policy.today(now) {
                    return Err(DomainError::validation("Target date cannot be in the past"));
                }
                match span {
                    UntilDateSpan::FullDay => {
                        DisablementWindow::new(now, Some(self.policy.end_of_local_day(date)?))
                    }
                    UntilDateSpan::WithDuration {
                        minutes,
                        start_time,
                    } => {
                        let minutes = required_minutes(*minutes)?;
                        let start = self.start_on(date, start_time.as_deref(), now)?;
                        DisablementWindow::new(start, Some(start + minutes))
                    }
                }
            }
        }
    }

    /// `start_time` on `date`, collapsed to `now` when absent or already past.
    fn start_on(
        &self,
        date: NaiveDate,
        start_time: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<DateTime<Utc>> {
        let Some(raw) = start_time else {
            return Ok(now);
        };
        let time = shared::validation::parse_time_of_day(raw)?;
        let start = self.policy.to_instant(date, time)?;
        Ok(start.max(now))
    }
}

fn required_minutes(minutes: Option<u32>) -> DomainResult<Duration> {
    let minutes = minutes.ok_or_else(|| {
        DomainError::validation("A duration in minutes is required for this mode")
    })?;
    shared::validation::validate_positive_minutes(minutes)?;
    Ok(Duration::minutes(i64::from(minutes)))
}

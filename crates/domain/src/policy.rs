//! Venue booking policy: opening hours, no-show grace and local time.

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Timelike, Utc,
};

use crate::error::{DomainError, DomainResult};

/// First hour (inclusive) at which a slot may start.
pub const DEFAULT_OPENING_HOUR: u32 = 5;
/// Hour (exclusive) after which no slot may start.
pub const DEFAULT_CLOSING_HOUR: u32 = 22;
/// Minutes after the slot start before an approved reservation counts as a no-show.
pub const DEFAULT_NO_SHOW_GRACE_MINUTES: i64 = 10;

const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// Rules shared by the availability checker, lifecycle and scheduler.
///
/// Reservation dates and times are local wall-clock values at the venue,
/// which sits at a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    opening_hour: u32,
    closing_hour: u32,
    no_show_grace_minutes: i64,
    offset: FixedOffset,
}

impl BookingPolicy {
    pub fn new(
        opening_hour: u32,
        closing_hour: u32,
        no_show_grace_minutes: i64,
        utc_offset_minutes: i32,
    ) -> DomainResult<Self> {
        if opening_hour >= closing_hour || closing_hour > 24 {
            return Err(DomainError::validation(
                "Opening hour must be before closing hour (max 24)",
            ));
        }
        if no_show_grace_minutes < 0 {
            return Err(DomainError::validation(
                "No-show grace period cannot be negative",
            ));
        }
        if utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(DomainError::validation(
                "UTC offset must be within +/-18 hours",
            ));
        }
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
            .ok_or_else(|| DomainError::validation("Invalid UTC offset"))?;

        Ok(Self {
            opening_hour,
            closing_hour,
            no_show_grace_minutes,
            offset,
        })
    }

    pub fn opening_hour(&self) -> u32 {
        self.opening_hour
    }

    pub fn closing_hour(&self) -> u32 {
        self.closing_hour
    }

    pub fn no_show_grace(&self) -> Duration {
        Duration::minutes(self.no_show_grace_minutes)
    }

    /// `opening_hour <= hour < closing_hour`; minutes are irrelevant.
    pub fn within_opening_hours(&self, time: NaiveTime) -> bool {
        let hour = time.hour();
        hour >= self.opening_hour && hour < self.closing_hour
    }

    pub fn opening_hours_message(&self) -> String {
        format!(
            "Reservations are only accepted between {:02}:00 and {:02}:00",
            self.opening_hour, self.closing_hour
        )
    }

    /// Converts a local date and time at the venue into an instant.
    pub fn to_instant(&self, date: NaiveDate, time: NaiveTime) -> DomainResult<DateTime<Utc>> {
        self.local_to_instant(date.and_time(time))
    }

    pub fn local_to_instant(&self, local: NaiveDateTime) -> DomainResult<DateTime<Utc>> {
        self.offset
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| DomainError::validation("Local time cannot be represented"))
    }

    pub fn local_now(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.offset)
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.local_now(now).date_naive()
    }

    /// The first instant of the local day after `now`.
    pub fn next_local_midnight(&self, now: DateTime<Utc>) -> DomainResult<DateTime<Utc>> {
        let tomorrow = self
            .today(now)
            .succ_opt()
            .ok_or_else(|| DomainError::validation("Date out of range"))?;
        self.to_instant(tomorrow, NaiveTime::MIN)
    }

    /// 23:59:59 local on `date`.
    pub fn end_of_local_day(&self, date: NaiveDate) -> DomainResult<DateTime<Utc>> {
        let last_second = NaiveTime::from_hms_opt(23, 59, 59)
            .ok_or_else(|| DomainError::validation("Invalid time"))?;
        self.to_instant(date, last_second)
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            opening_hour: DEFAULT_OPENING_HOUR,
            closing_hour: DEFAULT_CLOSING_HOUR,
            no_show_grace_minutes: DEFAULT_NO_SHOW_GRACE_MINUTES,
            offset: Utc.fix(),
        }
    }
}

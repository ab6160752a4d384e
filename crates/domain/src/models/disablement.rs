//! Court disablement models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Admin intent for taking a court out of service.
///
/// Required sub-fields are optional at the wire level so that a missing value
/// surfaces as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DisablementRequest {
    /// Disabled until explicitly enabled.
    Permanent,
    /// Disabled until the next local midnight.
    RestOfToday,
    /// Disabled for `minutes`, starting now or at `start_time` today.
    Duration {
        #[serde(default)]
        minutes: Option<u32>,
        #[serde(default, rename = "startTime")]
        start_time: Option<String>,
    },
    /// Disabled until a target date.
    UntilDate {
        #[serde(default)]
        date: Option<NaiveDate>,
        #[serde(default)]
        span: UntilDateSpan,
    },
}

/// How an until-date disablement ends on the target date.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UntilDateSpan {
    /// Through 23:59:59 of the target date.
    #[default]
    FullDay,
    /// For `minutes` from `start_time` on the target date.
    WithDuration {
        #[serde(default)]
        minutes: Option<u32>,
        #[serde(default, rename = "startTime")]
        start_time: Option<String>,
    },
}

impl DisablementRequest {
    pub fn mode(&self) -> &'static str {
        match self {
            DisablementRequest::Permanent => "permanent",
            DisablementRequest::RestOfToday => "rest_of_today",
            DisablementRequest::Duration { .. } => "duration",
            DisablementRequest::UntilDate { .. } => "until_date",
        }
    }
}

/// Concrete disablement interval. `disabled_until = None` means indefinite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisablementWindow {
    pub disabled_at: DateTime<Utc>,
    pub disabled_until: Option<DateTime<Utc>>,
}

impl DisablementWindow {
    pub fn new(
        disabled_at: DateTime<Utc>,
        disabled_until: Option<DateTime<Utc>>,
    ) -> DomainResult<Self> {
        if let Some(until) = disabled_until {
            if until < disabled_at {
                return Err(DomainError::validation(
                    "Disablement end must not be before its start",
                ));
            }
        }
        Ok(Self {
            disabled_at,
            disabled_until,
        })
    }

    pub fn permanent(disabled_at: DateTime<Utc>) -> Self {
        Self {
            disabled_at,
            disabled_until: None,
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.disabled_until.is_none()
    }
}

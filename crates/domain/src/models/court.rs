//! Court domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::DomainError;
use crate::models::disablement::DisablementWindow;

/// Sport played on a court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Basketball,
    Volleyball,
    Padel,
    Football,
}

impl Sport {
    pub const ALL: [Sport; 4] = [
        Sport::Basketball,
        Sport::Volleyball,
        Sport::Padel,
        Sport::Football,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Basketball => "basketball",
            Sport::Volleyball => "volleyball",
            Sport::Padel => "padel",
            Sport::Football => "football",
        }
    }

    /// Human readable label used in court names.
    pub fn label(&self) -> &'static str {
        match self {
            Sport::Basketball => "Basketball",
            Sport::Volleyball => "Volleyball",
            Sport::Padel => "Padel",
            Sport::Football => "Football",
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Sport {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basketball" => Ok(Sport::Basketball),
            "volleyball" => Ok(Sport::Volleyball),
            "padel" => Ok(Sport::Padel),
            "football" => Ok(Sport::Football),
            other => Err(DomainError::validation(format!("Unknown sport: {}", other))),
        }
    }
}

/// A bookable court.
///
/// `disabled_at` and `disabled_until` are only meaningful while `disabled` is
/// set; a disabled court without `disabled_until` is disabled indefinitely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Court {
    pub id: Uuid,
    pub name: String,
    pub sport: Sport,
    pub minimum_party_size: i32,
    #[serde(rename = "order")]
    pub display_order: i32,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_until: Option<DateTime<Utc>>,
}

impl Court {
    pub fn new(name: impl Into<String>, sport: Sport, minimum_party_size: i32, order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sport,
            minimum_party_size,
            display_order: order,
            disabled: false,
            disabled_at: None,
            disabled_until: None,
        }
    }

    /// Applies (or clears, with `None`) a disablement window.
    pub fn apply_disablement(&mut self, window: Option<DisablementWindow>) {
        match window {
            Some(window) => {
                self.disabled = true;
                self.disabled_at = Some(window.disabled_at);
                self.disabled_until = window.disabled_until;
            }
            None => {
                self.disabled = false;
                self.disabled_at = None;
                self.disabled_until = None;
            }
        }
    }

    /// Whether the disablement state prevents booking at `now`.
    ///
    /// A window whose end has passed no longer blocks, even though the flag
    /// stays set until the court is explicitly enabled.
    pub fn blocks_booking_at(&self, now: DateTime<Utc>) -> bool {
        if !self.disabled {
            return false;
        }
        match self.disabled_until {
            Some(until) => now < until,
            None => true,
        }
    }
}

/// Request payload for creating a court.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourtRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Court name must be between 1 and 100 characters"
    ))]
    pub name: String,

    pub sport: Sport,

    #[validate(range(min = 1, message = "Minimum party size must be at least 1"))]
    pub minimum_party_size: i32,

    #[serde(default)]
    pub order: i32,
}

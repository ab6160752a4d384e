//! User profile and reputation model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const MIN_STARS: i32 = 1;
pub const MAX_STARS: i32 = 5;
pub const DEFAULT_STARS: i32 = 5;

/// Clamps a rating into `[MIN_STARS, MAX_STARS]`.
pub fn clamp_stars(stars: i32) -> i32 {
    stars.clamp(MIN_STARS, MAX_STARS)
}

/// A user known to the booking system, keyed by the identity provider's subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub stars: i32,
    pub total_reservations: i32,
    pub no_show_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// A fresh profile with a full rating and no history.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        email: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email,
            stars: DEFAULT_STARS,
            total_reservations: 0,
            no_show_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// The profile after one penalty event.
    pub fn penalized(mut self, now: DateTime<Utc>) -> Self {
        self.stars = clamp_stars(self.stars - 1);
        self.no_show_count += 1;
        self.updated_at = now;
        self
    }
}

/// Request payload for creating or updating the caller's profile.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProfileRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Display name must be between 1 and 100 characters"
    ))]
    pub display_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

/// Admin override of a user's rating. Values outside the range are clamped.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRatingRequest {
    pub stars: i32,
}

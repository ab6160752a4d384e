//! System statistics for the admin dashboard.

use serde::Serialize;

use crate::models::court::Sport;

/// Aggregate counters over courts, reservations and users.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub total_reservations: i64,
    pub today_reservations: i64,
    pub month_reservations: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub cancelled: i64,
    pub no_shows: i64,
    pub total_users: i64,
    pub active_users: i64,
    /// Mean star rating rounded to one decimal; 5.0 with no users.
    pub average_rating: f64,
    pub total_courts: i64,
    pub active_courts: i64,
    pub disabled_courts: i64,
    pub by_sport: Vec<SportStats>,
}

/// Per-sport reservation breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SportStats {
    pub sport: Sport,
    pub total: i64,
    pub approved: i64,
    pub pending: i64,
    pub rejected: i64,
}

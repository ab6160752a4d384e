//! Public court endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use domain::models::Court;
use domain::services::SlotAvailability;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_sweep;

/// Query parameters for a slot availability check.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
    pub time: String,
}

/// Availability of one slot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub court_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "shared::time_format::hhmm")]
    pub time: NaiveTime,
    pub available: bool,
    #[serde(flatten)]
    pub slot: SlotAvailability,
}

/// Expires stale pending reservations before a read. A failed sweep does
/// not fail the read.
pub(crate) async fn sweep_expired_before_read(state: &AppState) {
    match state.services.lifecycle.sweep_expired().await {
        Ok(report) => record_sweep("expired", &report),
        Err(e) => warn!(error = %e, "Expiry sweep before read failed"),
    }
}

/// List all courts.
///
/// GET /api/v1/courts
pub async fn list_courts(State(state): State<AppState>) -> Result<Json<Vec<Court>>, ApiError> {
    sweep_expired_before_read(&state).await;
    let courts = state.services.courts.list_courts().await?;
    Ok(Json(courts))
}

/// Get a single court.
///
/// GET /api/v1/courts/:court_id
pub async fn get_court(
    State(state): State<AppState>,
    Path(court_id): Path<Uuid>,
) -> Result<Json<Court>, ApiError> {
    let court = state.services.courts.get_court(court_id).await?;
    Ok(Json(court))
}

/// Check whether a slot can be booked right now.
///
/// GET /api/v1/courts/:court_id/availability?date=YYYY-MM-DD&time=HH:MM
pub async fn check_availability(
    State(state): State<AppState>,
    Path(court_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let date = shared::validation::parse_date(&query.date)?;
    let time = shared::validation::parse_time_of_day(&query.time)?;

    sweep_expired_before_read(&state).await;
    let slot = state
        .services
        .availability
        .check_slot(court_id, date, time)
        .await?;

    Ok(Json(AvailabilityResponse {
        court_id,
        date,
        time,
        available: slot.is_available(),
        slot,
    }))
}

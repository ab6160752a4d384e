//! Admin endpoints: moderation, sweeps, courts, users and statistics.
//!
//! Every route here sits behind [`crate::middleware::require_admin`].

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    Court, CreateCourtRequest, DisablementRequest, ListReservationsQuery, NoShowCheckResponse,
    PostponeReservationRequest, ReasonRequest, Reservation, ReservationState, SetRatingRequest,
    SystemStats, UserProfile,
};
use domain::services::SweepSummary;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminIdentity;
use crate::middleware::metrics::{record_reservation_transition, record_sweep};

/// An empty body means no reason; anything else must be a valid [`ReasonRequest`].
fn reason_from(body: &[u8]) -> Result<Option<String>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ReasonRequest::default()
    } else {
        serde_json::from_slice::<ReasonRequest>(body)
            .map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))?
    };
    request.validate()?;
    Ok(request.reason)
}

// ============================================================================
// Reservations
// ============================================================================

/// All reservations, optionally filtered by state, by date and time ascending.
///
/// GET /api/v1/admin/reservations?status=
pub async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<ListReservationsQuery>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    let filter = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<ReservationState>)
        .transpose()?;
    let reservations = state.services.lifecycle.list_reservations(filter).await?;
    Ok(Json(reservations))
}

/// GET /api/v1/admin/reservations/pending
pub async fn list_pending_reservations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    let reservations = state.services.lifecycle.list_pending().await?;
    Ok(Json(reservations))
}

/// POST /api/v1/admin/reservations/:reservation_id/approve
pub async fn approve_reservation(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<Reservation>, ApiError> {
    let reservation = state.services.lifecycle.approve(reservation_id).await?;
    record_reservation_transition(reservation.state);
    info!(reservation_id = %reservation_id, admin_id = %admin.user_id, "Reservation approved by admin");
    Ok(Json(reservation))
}

/// POST /api/v1/admin/reservations/:reservation_id/reject
pub async fn reject_reservation(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(reservation_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<Reservation>, ApiError> {
    let reason = reason_from(&body)?;
    let reservation = state
        .services
        .lifecycle
        .reject(reservation_id, reason)
        .await?;
    record_reservation_transition(reservation.state);
    info!(reservation_id = %reservation_id, admin_id = %admin.user_id, "Reservation rejected by admin");
    Ok(Json(reservation))
}

/// Move a pending or approved reservation to a new slot; it ends up approved.
///
/// POST /api/v1/admin/reservations/:reservation_id/postpone
pub async fn postpone_reservation(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(reservation_id): Path<Uuid>,
    Json(request): Json<PostponeReservationRequest>,
) -> Result<Json<Reservation>, ApiError> {
    let reservation = state
        .services
        .lifecycle
        .postpone(reservation_id, request)
        .await?;
    record_reservation_transition(reservation.state);
    info!(
        reservation_id = %reservation_id,
        admin_id = %admin.user_id,
        date = %reservation.date,
        time = %reservation.time.format("%H:%M"),
        "Reservation postponed by admin"
    );
    Ok(Json(reservation))
}

/// Cancel an approved reservation. The user is not penalized.
///
/// POST /api/v1/admin/reservations/:reservation_id/cancel
pub async fn cancel_reservation(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(reservation_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<Reservation>, ApiError> {
    let reason = reason_from(&body)?;
    let reservation = state
        .services
        .lifecycle
        .cancel_by_admin(reservation_id, reason)
        .await?;
    record_reservation_transition(reservation.state);
    info!(reservation_id = %reservation_id, admin_id = %admin.user_id, "Reservation cancelled by admin");
    Ok(Json(reservation))
}

/// Apply the no-show rule to one reservation.
///
/// POST /api/v1/admin/reservations/:reservation_id/no-show-check
pub async fn check_no_show(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<NoShowCheckResponse>, ApiError> {
    let (transitioned, reservation) = state
        .services
        .lifecycle
        .check_no_show(reservation_id)
        .await?;
    if transitioned {
        record_reservation_transition(reservation.state);
    }
    Ok(Json(NoShowCheckResponse {
        transitioned,
        reservation,
    }))
}

/// Run both sweeps now.
///
/// POST /api/v1/admin/reservations/sweep
pub async fn run_sweeps(State(state): State<AppState>) -> Result<Json<SweepSummary>, ApiError> {
    let summary = state.services.lifecycle.sweep_all().await?;
    record_sweep("expired", &summary.expired);
    record_sweep("no_show", &summary.no_shows);
    Ok(Json(summary))
}

// ============================================================================
// Courts
// ============================================================================

/// POST /api/v1/admin/courts
pub async fn create_court(
    State(state): State<AppState>,
    Json(request): Json<CreateCourtRequest>,
) -> Result<(StatusCode, Json<Court>), ApiError> {
    let court = state.services.courts.create_court(request).await?;
    info!(court_id = %court.id, name = %court.name, "Court created");
    Ok((StatusCode::CREATED, Json(court)))
}

/// POST /api/v1/admin/courts/:court_id/disable
pub async fn disable_court(
    State(state): State<AppState>,
    Path(court_id): Path<Uuid>,
    Json(request): Json<DisablementRequest>,
) -> Result<Json<Court>, ApiError> {
    let court = state
        .services
        .disablement
        .disable_court(court_id, &request)
        .await?;
    Ok(Json(court))
}

/// POST /api/v1/admin/courts/:court_id/enable
pub async fn enable_court(
    State(state): State<AppState>,
    Path(court_id): Path<Uuid>,
) -> Result<Json<Court>, ApiError> {
    let court = state.services.disablement.enable_court(court_id).await?;
    Ok(Json(court))
}

// ============================================================================
// Users
// ============================================================================

/// All profiles, newest first.
///
/// GET /api/v1/admin/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let profiles = state.services.reputation.list_profiles().await?;
    Ok(Json(profiles))
}

/// GET /api/v1/admin/users/:user_id/reservations
pub async fn list_user_reservations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    let reservations = state
        .services
        .lifecycle
        .list_user_reservations(&user_id)
        .await?;
    Ok(Json(reservations))
}

/// Override a user's rating; out-of-range values are clamped.
///
/// PUT /api/v1/admin/users/:user_id/rating
pub async fn set_user_rating(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(user_id): Path<String>,
    Json(request): Json<SetRatingRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state
        .services
        .reputation
        .set_rating(&user_id, request.stars)
        .await?;
    info!(user_id = %user_id, admin_id = %admin.user_id, stars = profile.stars, "Rating set by admin");
    Ok(Json(profile))
}

// ============================================================================
// Statistics
// ============================================================================

/// GET /api/v1/admin/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<SystemStats>, ApiError> {
    let stats = state.services.stats.system_stats().await?;
    Ok(Json(stats))
}

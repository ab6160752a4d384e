//! User reservation endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{CreateReservationRequest, Reservation};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CallerIdentity;
use crate::middleware::metrics::record_reservation_transition;

/// Book a slot. The reservation starts out pending.
///
/// POST /api/v1/reservations
pub async fn create_reservation(
    State(state): State<AppState>,
    identity: CallerIdentity,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    state
        .services
        .reputation
        .ensure_profile(
            &identity.user_id,
            identity.display_name(),
            identity.email.clone(),
        )
        .await?;

    let reservation = state
        .services
        .lifecycle
        .create(&identity.user_id, request)
        .await?;
    record_reservation_transition(reservation.state);

    Ok((StatusCode::CREATED, Json(reservation)))
}

/// The caller's reservations, newest first.
///
/// GET /api/v1/me/reservations
pub async fn list_my_reservations(
    State(state): State<AppState>,
    identity: CallerIdentity,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    let reservations = state
        .services
        .lifecycle
        .list_user_reservations(&identity.user_id)
        .await?;
    Ok(Json(reservations))
}

/// A single reservation. Users only see their own; admins see any.
///
/// GET /api/v1/reservations/:reservation_id
pub async fn get_reservation(
    State(state): State<AppState>,
    identity: CallerIdentity,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<Reservation>, ApiError> {
    let lifecycle = &state.services.lifecycle;
    let reservation = if identity.is_admin {
        lifecycle.get_reservation(reservation_id).await?
    } else {
        lifecycle
            .get_reservation_for_user(reservation_id, &identity.user_id)
            .await?
    };
    Ok(Json(reservation))
}

/// Cancel one of the caller's pending reservations. Costs one star.
///
/// POST /api/v1/reservations/:reservation_id/cancel
pub async fn cancel_reservation(
    State(state): State<AppState>,
    identity: CallerIdentity,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<Reservation>, ApiError> {
    let reservation = state
        .services
        .lifecycle
        .cancel_by_user(reservation_id, &identity.user_id)
        .await?;
    record_reservation_transition(reservation.state);
    Ok(Json(reservation))
}

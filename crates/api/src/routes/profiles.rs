//! Caller profile endpoints.

use axum::{extract::State, Json};
use domain::models::{UpsertProfileRequest, UserProfile};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CallerIdentity;

/// Create or update the caller's profile. Reputation is never changed here.
///
/// PUT /api/v1/me/profile
pub async fn upsert_my_profile(
    State(state): State<AppState>,
    identity: CallerIdentity,
    Json(request): Json<UpsertProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state
        .services
        .reputation
        .register_profile(&identity.user_id, request)
        .await?;
    info!(user_id = %profile.id, "Profile saved");
    Ok(Json(profile))
}

/// The caller's profile, created from token claims on first access.
///
/// GET /api/v1/me/profile
pub async fn get_my_profile(
    State(state): State<AppState>,
    identity: CallerIdentity,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state
        .services
        .reputation
        .ensure_profile(
            &identity.user_id,
            identity.display_name(),
            identity.email.clone(),
        )
        .await?;
    Ok(Json(profile))
}

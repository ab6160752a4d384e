//! Route-layer authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::identity::authenticate;

/// Rejects requests without a valid identity token and stores the
/// [`crate::extractors::CallerIdentity`] in request extensions.
pub async fn require_identity(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state.verifier, &state.config.auth.admin_role, req.headers()) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Like [`require_identity`], and additionally requires the admin role.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let identity =
        match authenticate(&state.verifier, &state.config.auth.admin_role, req.headers()) {
            Ok(identity) => identity,
            Err(e) => return e.into_response(),
        };

    if !identity.is_admin {
        tracing::info!(user_id = %identity.user_id, "Admin route refused");
        return ApiError::Forbidden("Admin role required".to_string()).into_response();
    }

    req.extensions_mut().insert(identity);
    next.run(req).await
}

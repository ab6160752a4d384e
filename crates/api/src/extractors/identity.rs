//! Caller identity extractors.
//!
//! The Bearer token is verified against the identity provider's key. Routes
//! behind [`crate::middleware::require_identity`] find the identity already
//! in request extensions; other routes verify the token here.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use shared::identity::{IdentityClaims, IdentityError, IdentityVerifier};

use crate::app::AppState;
use crate::error::ApiError;

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Subject claim of the identity token.
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_admin: bool,
}

impl CallerIdentity {
    pub fn from_claims(claims: IdentityClaims, admin_role: &str) -> Self {
        let is_admin = claims.role.as_deref() == Some(admin_role);
        Self {
            user_id: claims.sub,
            name: claims.name.filter(|n| !n.trim().is_empty()),
            email: claims.email,
            is_admin,
        }
    }

    /// Name shown on reservations; falls back to the subject.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.user_id)
    }
}

/// Returns the Bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

/// Verifies the request's token and builds the caller identity.
pub fn authenticate(
    verifier: &IdentityVerifier,
    admin_role: &str,
    headers: &HeaderMap,
) -> Result<CallerIdentity, ApiError> {
    let token = bearer_token(headers)?;
    let claims = verifier.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Identity token rejected");
        match e {
            IdentityError::TokenExpired => ApiError::Unauthorized("Token has expired".to_string()),
            _ => ApiError::Unauthorized("Invalid or expired token".to_string()),
        }
    })?;
    Ok(CallerIdentity::from_claims(claims, admin_role))
}

#[async_trait]
impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<CallerIdentity>() {
            return Ok(identity.clone());
        }
        authenticate(&state.verifier, &state.config.auth.admin_role, &parts.headers)
    }
}

/// A caller holding the admin role.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub CallerIdentity);

#[async_trait]
impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = CallerIdentity::from_request_parts(parts, state).await?;
        if !identity.is_admin {
            return Err(ApiError::Forbidden("Admin role required".to_string()));
        }
        Ok(AdminIdentity(identity))
    }
}

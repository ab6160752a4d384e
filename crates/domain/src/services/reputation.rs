//! Reputation ledger: profiles and star ratings.
//!
//! Penalties and reservation counters change only together with the
//! reservation that causes them, through the store's combined writes.

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::clock::Clock;
use crate::error::{DomainError, DomainResult};
use crate::models::user::{clamp_stars, UpsertProfileRequest};
use crate::models::UserProfile;
use crate::store::BookingStore;

#[derive(Clone)]
pub struct ReputationLedger {
    store: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
}

fn unknown_user(user_id: &str) -> DomainError {
    DomainError::not_found(format!("User {} not found", user_id))
}

impl ReputationLedger {
    pub fn new(store: Arc<dyn BookingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Admin override. Out-of-range values are clamped to `[1, 5]`.
    pub async fn set_rating(&self, user_id: &str, stars: i32) -> DomainResult<UserProfile> {
        let stars = clamp_stars(stars);
        let profile = self
            .store
            .set_stars(user_id, stars, self.clock.now())
            .await?
            .ok_or_else(|| unknown_user(user_id))?;

        info!(user_id = %user_id, stars, "User rating set");
        Ok(profile)
    }

    /// Creates the profile with a clean reputation, or updates its contact
    /// details if it already exists.
    pub async fn register_profile(
        &self,
        user_id: &str,
        request: UpsertProfileRequest,
    ) -> DomainResult<UserProfile> {
        request.validate()?;

        let profile = UserProfile::new(
            user_id,
            request.display_name.trim(),
            request.email,
            self.clock.now(),
        );
        self.store.upsert_profile(&profile).await
    }

    /// Returns the profile, creating it from identity claims when absent.
    pub async fn ensure_profile(
        &self,
        user_id: &str,
        display_name: &str,
        email: Option<String>,
    ) -> DomainResult<UserProfile> {
        if let Some(profile) = self.store.find_profile(user_id).await? {
            return Ok(profile);
        }
        let profile = UserProfile::new(user_id, display_name, email, self.clock.now());
        self.store.upsert_profile(&profile).await
    }

    pub async fn get_profile(&self, user_id: &str) -> DomainResult<UserProfile> {
        self.store
            .find_profile(user_id)
            .await?
            .ok_or_else(|| unknown_user(user_id))
    }

    /// All profiles, newest first.
    pub async fn list_profiles(&self) -> DomainResult<Vec<UserProfile>> {
        self.store.list_profiles().await
    }
}

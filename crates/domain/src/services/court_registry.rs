//! Court registry: existence, sport classification and disablement state.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{DomainError, DomainResult};
use crate::models::court::CreateCourtRequest;
use crate::models::{Court, DisablementWindow};
use crate::store::BookingStore;

#[derive(Clone)]
pub struct CourtRegistry {
    store: Arc<dyn BookingStore>,
}

impl CourtRegistry {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Adds a new, enabled court. Names are unique.
    pub async fn create_court(&self, request: CreateCourtRequest) -> DomainResult<Court> {
        request.validate()?;

        let court = Court::new(
            request.name.trim(),
            request.sport,
            request.minimum_party_size,
            request.order,
        );
        if !self.store.insert_court_if_absent(&court).await? {
            return Err(DomainError::Conflict(format!(
                "A court named '{}' already exists",
                court.name
            )));
        }

        info!(court_id = %court.id, name = %court.name, sport = %court.sport, "Court created");
        Ok(court)
    }

    pub async fn get_court(&self, id: Uuid) -> DomainResult<Court> {
        self.store
            .find_court(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Court {} not found", id)))
    }

    /// All courts in display order.
    pub async fn list_courts(&self) -> DomainResult<Vec<Court>> {
        self.store.list_courts().await
    }

    pub async fn set_disabled(&self, id: Uuid, window: DisablementWindow) -> DomainResult<Court> {
        let window = DisablementWindow::new(window.disabled_at, window.disabled_until)?;
        let court = self
            .store
            .save_disablement(id, Some(window))
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Court {} not found", id)))?;

        info!(
            court_id = %id,
            disabled_at = %window.disabled_at,
            disabled_until = ?window.disabled_until,
            "Court disabled"
        );
        Ok(court)
    }

    /// Clears every disablement field.
    pub async fn set_enabled(&self, id: Uuid) -> DomainResult<Court> {
        let court = self
            .store
            .save_disablement(id, None)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Court {} not found", id)))?;

        info!(court_id = %id, "Court enabled");
        Ok(court)
    }

    pub(crate) fn store(&self) -> &Arc<dyn BookingStore> {
        &self.store
    }
}

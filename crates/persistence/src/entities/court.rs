//! Court entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Court, Sport};
use sqlx::FromRow;
use uuid::Uuid;

use super::EntityError;

/// Database row mapping for the courts table.
#[derive(Debug, Clone, FromRow)]
pub struct CourtEntity {
    pub id: Uuid,
    pub name: String,
    pub sport: String,
    pub minimum_party_size: i32,
    pub display_order: i32,
    pub disabled: bool,
    pub disabled_at: Option<DateTime<Utc>>,
    pub disabled_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CourtEntity> for Court {
    type Error = EntityError;

    fn try_from(entity: CourtEntity) -> Result<Self, Self::Error> {
        let sport: Sport = entity
            .sport
            .parse()
            .map_err(|_| EntityError::UnknownSport(entity.sport.clone()))?;

        // An enabled court never exposes disablement timestamps.
        let (disabled_at, disabled_until) = if entity.disabled {
            (entity.disabled_at, entity.disabled_until)
        } else {
            (None, None)
        };

        Ok(Court {
            id: entity.id,
            name: entity.name,
            sport,
            minimum_party_size: entity.minimum_party_size,
            display_order: entity.display_order,
            disabled: entity.disabled,
            disabled_at,
            disabled_until,
        })
    }
}

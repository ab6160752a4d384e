//! Reservation entity (database row mapping).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domain::models::{Reservation, ReservationState, Sport};
use sqlx::FromRow;
use uuid::Uuid;

use super::EntityError;

/// Database row mapping for the reservations table.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationEntity {
    pub id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub court_id: Uuid,
    pub court_name: String,
    pub sport: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub date_time: DateTime<Utc>,
    pub party_size: i32,
    pub status: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationEntity> for Reservation {
    type Error = EntityError;

    fn try_from(entity: ReservationEntity) -> Result<Self, Self::Error> {
        let state: ReservationState = entity
            .status
            .parse()
            .map_err(|_| EntityError::UnknownStatus(entity.status.clone()))?;
        let sport: Sport = entity
            .sport
            .parse()
            .map_err(|_| EntityError::UnknownSport(entity.sport.clone()))?;

        Ok(Reservation {
            id: entity.id,
            user_id: entity.user_id,
            user_name: entity.user_name,
            court_id: entity.court_id,
            court_name: entity.court_name,
            sport,
            date: entity.date,
            time: entity.time,
            date_time: entity.date_time,
            party_size: entity.party_size,
            state,
            reason: entity.reason,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

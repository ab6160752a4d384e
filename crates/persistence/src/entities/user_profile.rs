//! User profile entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::UserProfile;
use sqlx::FromRow;

/// Database row mapping for the user_profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct UserProfileEntity {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub stars: i32,
    pub total_reservations: i32,
    pub no_show_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfileEntity> for UserProfile {
    fn from(entity: UserProfileEntity) -> Self {
        Self {
            id: entity.id,
            display_name: entity.display_name,
            email: entity.email,
            stars: entity.stars,
            total_reservations: entity.total_reservations,
            no_show_count: entity.no_show_count,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

//! User profile repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::UserProfile;
use sqlx::PgPool;

use crate::entities::UserProfileEntity;
use crate::metrics::QueryTimer;

/// Repository for user profiles and their reputation counters.
#[derive(Clone)]
pub struct UserProfileRepository {
    pool: PgPool,
}

impl UserProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the profile, or refreshes name and email of an existing row.
    /// Reputation columns of an existing row are never touched.
    pub async fn upsert(&self, profile: &UserProfile) -> Result<UserProfileEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_user_profile");
        let result = sqlx::query_as::<_, UserProfileEntity>(
            r#"
            INSERT INTO user_profiles (id, display_name, email, stars, total_reservations,
                                       no_show_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                email = EXCLUDED.email,
                updated_at = EXCLUDED.updated_at
            RETURNING id, display_name, email, stars, total_reservations, no_show_count,
                      created_at, updated_at
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.display_name)
        .bind(&profile.email)
        .bind(profile.stars)
        .bind(profile.total_reservations)
        .bind(profile.no_show_count)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<UserProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_profile_by_id");
        let result = sqlx::query_as::<_, UserProfileEntity>(
            r#"
            SELECT id, display_name, email, stars, total_reservations, no_show_count,
                   created_at, updated_at
            FROM user_profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All profiles, newest first.
    pub async fn list_all(&self) -> Result<Vec<UserProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_user_profiles");
        let result = sqlx::query_as::<_, UserProfileEntity>(
            r#"
            SELECT id, display_name, email, stars, total_reservations, no_show_count,
                   created_at, updated_at
            FROM user_profiles
            ORDER BY created_at DESC, id
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn set_stars(
        &self,
        id: &str,
        stars: i32,
        at: DateTime<Utc>,
    ) -> Result<Option<UserProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_user_stars");
        let result = sqlx::query_as::<_, UserProfileEntity>(
            r#"
            UPDATE user_profiles
            SET stars = LEAST(5, GREATEST(1, $2)),
                updated_at = $3
            WHERE id = $1
            RETURNING id, display_name, email, stars, total_reservations, no_show_count,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(stars)
        .bind(at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}

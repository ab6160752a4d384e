//! Court repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::Court;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::CourtEntity;
use crate::metrics::QueryTimer;

const COURT_COLUMNS: &str = "id, name, sport, minimum_party_size, display_order, \
                             disabled, disabled_at, disabled_until, created_at";

/// Repository for court-related database operations.
#[derive(Clone)]
pub struct CourtRepository {
    pool: PgPool,
}

impl CourtRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a court unless the name is taken. Returns whether a row was written.
    pub async fn insert_if_absent(&self, court: &Court) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("insert_court_if_absent");
        let result = sqlx::query(
            r#"
            INSERT INTO courts (id, name, sport, minimum_party_size, display_order,
                                disabled, disabled_at, disabled_until)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(court.id)
        .bind(&court.name)
        .bind(court.sport.as_str())
        .bind(court.minimum_party_size)
        .bind(court.display_order)
        .bind(court.disabled)
        .bind(court.disabled_at)
        .bind(court.disabled_until)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected() == 1)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CourtEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_court_by_id");
        let result = sqlx::query_as::<_, CourtEntity>(&format!(
            "SELECT {} FROM courts WHERE id = $1",
            COURT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list_all(&self) -> Result<Vec<CourtEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_courts");
        let result = sqlx::query_as::<_, CourtEntity>(&format!(
            "SELECT {} FROM courts ORDER BY display_order, name",
            COURT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Writes the disablement columns. `disabled = false` clears both timestamps.
    pub async fn set_disablement(
        &self,
        id: Uuid,
        disabled: bool,
        disabled_at: Option<DateTime<Utc>>,
        disabled_until: Option<DateTime<Utc>>,
    ) -> Result<Option<CourtEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_court_disablement");
        let result = sqlx::query_as::<_, CourtEntity>(&format!(
            r#"
            UPDATE courts
            SET disabled = $2,
                disabled_at = CASE WHEN $2 THEN $3 ELSE NULL END,
                disabled_until = CASE WHEN $2 THEN $4 ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COURT_COLUMNS
        ))
        .bind(id)
        .bind(disabled)
        .bind(disabled_at)
        .bind(disabled_until)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}

//! Reservation repository for database operations.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domain::models::Reservation;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ReservationEntity;
use crate::metrics::QueryTimer;

const RESERVATION_COLUMNS: &str = "id, user_id, user_name, court_id, court_name, sport, \
                                   date, time, date_time, party_size, status, reason, \
                                   created_at, updated_at";

/// Listing filter. `None` fields are not constrained.
#[derive(Debug, Clone, Default)]
pub struct ReservationQuery<'a> {
    pub user_id: Option<&'a str>,
    pub court_id: Option<Uuid>,
    pub status: Option<&'a str>,
    pub due_before: Option<DateTime<Utc>>,
}

/// Conditional status update. Applied only while the row is in `from_status`.
#[derive(Debug, Clone)]
pub struct ReservationUpdate<'a> {
    pub from_status: &'a str,
    pub to_status: &'a str,
    pub reason: Option<&'a str>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub date_time: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    /// Also record a penalty on the owner's profile.
    pub penalize_owner: bool,
}

/// Repository for reservation-related database operations.
#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the reservation and bumps the owner's reservation counter in
    /// one transaction. Returns `false`, writing nothing, when the owner has
    /// no profile.
    pub async fn insert(&self, reservation: &Reservation) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("insert_reservation");
        let mut tx = self.pool.begin().await?;

        let counted = sqlx::query(
            r#"
            UPDATE user_profiles
            SET total_reservations = total_reservations + 1,
                updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(&reservation.user_id)
        .bind(reservation.created_at)
        .execute(&mut *tx)
        .await?;
        if counted.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO reservations (id, user_id, user_name, court_id, court_name, sport,
                                      date, time, date_time, party_size, status, reason,
                                      created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(reservation.id)
        .bind(&reservation.user_id)
        .bind(&reservation.user_name)
        .bind(reservation.court_id)
        .bind(&reservation.court_name)
        .bind(reservation.sport.as_str())
        .bind(reservation.date)
        .bind(reservation.time)
        .bind(reservation.date_time)
        .bind(reservation.party_size)
        .bind(reservation.state.as_str())
        .bind(&reservation.reason)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(true)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ReservationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_reservation_by_id");
        let result = sqlx::query_as::<_, ReservationEntity>(&format!(
            "SELECT {} FROM reservations WHERE id = $1",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Matching rows ordered by slot instant, then creation.
    pub async fn list(
        &self,
        query: &ReservationQuery<'_>,
    ) -> Result<Vec<ReservationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_reservations");
        let result = sqlx::query_as::<_, ReservationEntity>(&format!(
            r#"
            SELECT {}
            FROM reservations
            WHERE ($1::text IS NULL OR user_id = $1)
              AND ($2::uuid IS NULL OR court_id = $2)
              AND ($3::text IS NULL OR status = $3)
              AND ($4::timestamptz IS NULL OR date_time < $4)
            ORDER BY date_time, created_at
            "#,
            RESERVATION_COLUMNS
        ))
        .bind(query.user_id)
        .bind(query.court_id)
        .bind(query.status)
        .bind(query.due_before)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn approved_exists_for_slot(
        &self,
        court_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        excluding: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("approved_exists_for_slot");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM reservations
                WHERE court_id = $1
                  AND date = $2
                  AND time = $3
                  AND status = 'approved'
                  AND ($4::uuid IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(court_id)
        .bind(date)
        .bind(time)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Compare-and-set on `status`. Returns `None` when no row matched.
    ///
    /// The owner's penalty, when requested, commits together with the status
    /// change. A second approved row on a slot fails on
    /// `reservations_one_approved_per_slot`.
    pub async fn transition(
        &self,
        id: Uuid,
        update: &ReservationUpdate<'_>,
    ) -> Result<Option<ReservationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("transition_reservation");
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, ReservationEntity>(&format!(
            r#"
            UPDATE reservations
            SET status = $3,
                reason = $4,
                updated_at = $5,
                date = COALESCE($6, date),
                time = COALESCE($7, time),
                date_time = COALESCE($8, date_time)
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .bind(update.from_status)
        .bind(update.to_status)
        .bind(update.reason)
        .bind(update.updated_at)
        .bind(update.date)
        .bind(update.time)
        .bind(update.date_time)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            return Ok(None);
        };

        if update.penalize_owner {
            let penalized = sqlx::query(
                r#"
                UPDATE user_profiles
                SET stars = GREATEST(1, stars - 1),
                    no_show_count = no_show_count + 1,
                    updated_at = $2
                WHERE id = $1
                "#,
            )
            .bind(&updated.user_id)
            .bind(update.updated_at)
            .execute(&mut *tx)
            .await?;
            if penalized.rows_affected() == 0 {
                return Err(sqlx::Error::RowNotFound);
            }
        }

        tx.commit().await?;
        timer.record();
        Ok(Some(updated))
    }
}

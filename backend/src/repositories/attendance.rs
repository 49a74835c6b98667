//! Attendance session storage
//!
//! One row per gym visit. A row is open (`checked-in`) until check-out
//! stamps `check_out`, `duration_minutes` and flips the status. The partial
//! unique index on open rows keeps at most one open session per member.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Attendance row from the `attendance` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

const COLUMNS: &str =
    "id, user_id, date, check_in, check_out, duration_minutes, status, created_at";

/// Attendance repository
pub struct AttendanceRepository;

impl AttendanceRepository {
    /// Open a session for `date` starting at `check_in`
    pub async fn create_check_in(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
        check_in: DateTime<Utc>,
    ) -> Result<AttendanceRow> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"
            INSERT INTO attendance (user_id, date, check_in, status)
            VALUES ($1, $2, $3, 'checked-in')
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(date)
        .bind(check_in)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    /// The member's open session, if any
    pub async fn find_open(pool: &PgPool, user_id: Uuid) -> Result<Option<AttendanceRow>> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM attendance
            WHERE user_id = $1 AND status = 'checked-in'
            ORDER BY check_in DESC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// Most recent session dated `date`
    pub async fn find_latest_for_date(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRow>> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM attendance
            WHERE user_id = $1 AND date = $2
            ORDER BY check_in DESC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// Close an open session
    ///
    /// Returns `None` when the row is no longer open, e.g. a concurrent
    /// check-out won the race.
    pub async fn close_session(
        pool: &PgPool,
        id: Uuid,
        check_out: DateTime<Utc>,
        duration_minutes: i32,
    ) -> Result<Option<AttendanceRow>> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"
            UPDATE attendance
            SET check_out = $2,
                duration_minutes = $3,
                status = 'checked-out',
                updated_at = NOW()
            WHERE id = $1 AND status = 'checked-in'
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(check_out)
        .bind(duration_minutes)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// Newest-first history, optionally starting at `start_date`
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        start_date: Option<NaiveDate>,
        limit: i64,
    ) -> Result<Vec<AttendanceRow>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM attendance
            WHERE user_id = $1
              AND ($2::date IS NULL OR date >= $2)
            ORDER BY date DESC, check_in DESC
            LIMIT $3
            "#
        ))
        .bind(user_id)
        .bind(start_date)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// All sessions dated within `first..=last`, newest first
    pub async fn list_between(
        pool: &PgPool,
        user_id: Uuid,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<AttendanceRow>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM attendance
            WHERE user_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date DESC, check_in DESC
            "#
        ))
        .bind(user_id)
        .bind(first)
        .bind(last)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}

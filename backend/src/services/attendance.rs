//! Attendance check-in/check-out and dashboard reductions
//!
//! Persistence goes through `AttendanceRepository`; every number shown on
//! the dashboard comes from the pure analyzer in `gym_dashboard_shared`.

use crate::config::AttendanceConfig;
use crate::error::ApiError;
use crate::repositories::{AttendanceRepository, AttendanceRow};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use gym_dashboard_shared::attendance::{
    build_calendar_presence, compute_attendance_stats, compute_weekly_summary, AttendanceRecord,
    AttendanceStatus,
};
use gym_dashboard_shared::types::{
    AttendanceHistoryQuery, AttendanceSummaryResponse, CalendarResponse, UserAttendanceResponse,
};
use gym_dashboard_shared::validation::{validate_calendar_month, ValidationError};
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Attendance service
pub struct AttendanceService;

impl AttendanceService {
    /// Most recent session dated today (UTC)
    pub async fn today(
        pool: &PgPool,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, ApiError> {
        let row = AttendanceRepository::find_latest_for_date(pool, user_id, now.date_naive())
            .await
            .map_err(ApiError::Internal)?;

        Ok(row.map(to_record))
    }

    /// Open a session
    ///
    /// Fails with `Conflict` while another session is open. The pre-check
    /// gives a clean message; the partial unique index catches the race.
    pub async fn check_in(
        pool: &PgPool,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, ApiError> {
        if let Some(open) = AttendanceRepository::find_open(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
        {
            debug!(user_id = %user_id, session_id = %open.id, "Check-in with open session");
            return Err(already_checked_in());
        }

        let row = AttendanceRepository::create_check_in(pool, user_id, now.date_naive(), now)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    already_checked_in()
                } else {
                    ApiError::Internal(e)
                }
            })?;

        info!(user_id = %user_id, session_id = %row.id, "Member checked in");
        Ok(to_record(row))
    }

    /// Close the open session, stamping `check_out` and the rounded duration
    pub async fn check_out(
        pool: &PgPool,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, ApiError> {
        let open = AttendanceRepository::find_open(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(no_open_session)?;

        let minutes = session_minutes(open.check_in, now);
        let row = AttendanceRepository::close_session(pool, open.id, now, minutes)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(no_open_session)?;

        info!(
            user_id = %user_id,
            session_id = %row.id,
            duration_minutes = minutes,
            "Member checked out"
        );
        Ok(to_record(row))
    }

    /// History for `target_user_id` with derived stats
    ///
    /// Members may only read their own history.
    pub async fn user_attendance(
        pool: &PgPool,
        config: &AttendanceConfig,
        requester: Uuid,
        target_user_id: Uuid,
        query: &AttendanceHistoryQuery,
    ) -> Result<UserAttendanceResponse, ApiError> {
        if requester != target_user_id {
            warn!(requester = %requester, target = %target_user_id, "Cross-member history request");
            return Err(ApiError::Forbidden(
                "Cannot read another member's attendance".to_string(),
            ));
        }

        let limit = query.effective_limit(config.default_history_limit, config.max_history_limit);
        let rows = AttendanceRepository::list_for_user(pool, target_user_id, query.start_date, limit)
            .await
            .map_err(ApiError::Internal)?;

        let attendance: Vec<AttendanceRecord> = rows.into_iter().map(to_record).collect();
        let stats = compute_attendance_stats(&attendance);

        Ok(UserAttendanceResponse { attendance, stats })
    }

    /// Weekly card plus all-window stats
    pub async fn summary(
        pool: &PgPool,
        config: &AttendanceConfig,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AttendanceSummaryResponse, ApiError> {
        let today = now.date_naive();
        let first = today - Duration::days(config.summary_window_days.max(0));
        let rows = AttendanceRepository::list_between(pool, user_id, first, today)
            .await
            .map_err(ApiError::Internal)?;

        let records: Vec<AttendanceRecord> = rows.into_iter().map(to_record).collect();

        Ok(AttendanceSummaryResponse {
            weekly: compute_weekly_summary(&records, now),
            stats: compute_attendance_stats(&records),
        })
    }

    /// Presence markers for one calendar month
    pub async fn calendar(
        pool: &PgPool,
        user_id: Uuid,
        month: u32,
        year: i32,
    ) -> Result<CalendarResponse, ApiError> {
        validate_calendar_month(month, year).map_err(|m| ValidationError::new("month", &m))?;
        let (first, last) = month_bounds(month, year)
            .ok_or_else(|| ApiError::from(ValidationError::new("month", "Invalid month")))?;

        let rows = AttendanceRepository::list_between(pool, user_id, first, last)
            .await
            .map_err(ApiError::Internal)?;
        let records: Vec<AttendanceRecord> = rows.into_iter().map(to_record).collect();

        Ok(CalendarResponse {
            month,
            year,
            days: build_calendar_presence(&records, month, year),
        })
    }
}

fn already_checked_in() -> ApiError {
    ApiError::Conflict("Already checked in".to_string())
}

fn no_open_session() -> ApiError {
    ApiError::NotFound("No open session to check out of".to_string())
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|e| e.is_unique_violation())
        .unwrap_or(false)
}

/// Whole minutes between check-in and check-out, rounded, never negative
pub fn session_minutes(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> i32 {
    let seconds = (check_out - check_in).num_seconds().max(0);
    let minutes = (seconds as f64 / 60.0).round();
    minutes.min(i32::MAX as f64) as i32
}

/// First and last day of a calendar month
pub fn month_bounds(month: u32, year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// Map a stored row onto the analyzer's record type
///
/// An unrecognized status string falls back to what the timestamps say.
pub fn to_record(row: AttendanceRow) -> AttendanceRecord {
    let status = row.status.parse::<AttendanceStatus>().unwrap_or_else(|_| {
        if row.check_out.is_some() {
            AttendanceStatus::CheckedOut
        } else {
            AttendanceStatus::CheckedIn
        }
    });

    AttendanceRecord {
        id: row.id,
        date: Some(row.date),
        check_in: row.check_in,
        check_out: row.check_out,
        duration_minutes: row.duration_minutes.map(i64::from),
        status,
    }
}

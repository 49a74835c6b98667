//! Attendance analytics
//!
//! Reduces a member's attendance history, as returned by the attendance
//! store, into the dashboard's summary cards, streak counter and calendar
//! markers. Nothing in here reads or writes the store itself.
//!
//! Records arrive unsorted and are not trusted: an entry whose date is
//! missing or unparseable is skipped by every date-based computation instead
//! of failing the whole reduction.

use crate::errors::PayloadError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Largest gap in days between adjacent visits that keeps a streak alive
pub const STREAK_MAX_GAP_DAYS: i64 = 7;

/// Look-back window of the weekly summary
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

// ============================================================================
// Record Types
// ============================================================================

/// Session state of an attendance record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    CheckedIn,
    CheckedOut,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::CheckedIn => "checked-in",
            AttendanceStatus::CheckedOut => "checked-out",
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checked-in" => Ok(AttendanceStatus::CheckedIn),
            "checked-out" => Ok(AttendanceStatus::CheckedOut),
            _ => Err(format!("Unknown attendance status: {}", s)),
        }
    }
}

/// A single gym visit
///
/// A checked-out record is expected to carry `check_out` and a non-negative
/// `duration_minutes`; a checked-in one has neither. Violations are tolerated:
/// a missing duration counts as zero and a missing `check_out` marks the
/// session as still open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    /// `None` when the store returned a missing or malformed date
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    pub check_in: DateTime<Utc>,
    #[serde(default)]
    pub check_out: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    /// Whether the session has not been checked out yet
    #[inline]
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }

    /// Recorded duration, zero when absent
    #[inline]
    pub fn minutes(&self) -> i64 {
        self.duration_minutes.unwrap_or(0)
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; anything else becomes `None`
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(parse_record_date))
}

/// Parse the date of an attendance record
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// Decode the `attendance` array returned by the store
pub fn parse_records(json: &str) -> Result<Vec<AttendanceRecord>, PayloadError> {
    Ok(serde_json::from_str(json)?)
}

// ============================================================================
// Summaries
// ============================================================================

/// Visits in the last seven days
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub visits: u32,
    pub hours: f64,
    pub avg_duration_minutes: f64,
}

/// All-time statistics over a fetched history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub total_visits: u32,
    pub total_hours: f64,
    pub average_duration_minutes: f64,
    pub current_streak_days: u32,
}

/// Summarize the visits dated within the last week
///
/// A record counts when its date (at midnight UTC) is no earlier than
/// `now - 7 days`. Open sessions count as visits with zero minutes.
pub fn compute_weekly_summary(records: &[AttendanceRecord], now: DateTime<Utc>) -> WeeklySummary {
    let cutoff = now - Duration::days(WEEKLY_WINDOW_DAYS);

    let (visits, minutes) = records
        .iter()
        .filter(|r| {
            r.date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .is_some_and(|midnight| midnight.and_utc() >= cutoff)
        })
        .fold((0u32, 0i64), |(visits, minutes), r| {
            (visits.saturating_add(1), minutes.saturating_add(r.minutes()))
        });

    WeeklySummary {
        visits,
        hours: minutes as f64 / 60.0,
        avg_duration_minutes: if visits > 0 {
            minutes as f64 / f64::from(visits)
        } else {
            0.0
        },
    }
}

/// Count the records in the most recent run of visits spaced at most a week apart
///
/// Records are ordered newest first and walked pairwise; the first gap of
/// more than [`STREAK_MAX_GAP_DAYS`] ends the run. This counts records, not
/// distinct days: two check-ins on the same date both add to the streak.
pub fn compute_streak(records: &[AttendanceRecord]) -> u32 {
    let mut dates: Vec<NaiveDate> = records.iter().filter_map(|r| r.date).collect();
    if dates.is_empty() {
        return 0;
    }
    dates.sort_unstable_by(|a, b| b.cmp(a));

    let mut streak = 1;
    for pair in dates.windows(2) {
        let gap = (pair[0] - pair[1]).num_days();
        if gap > STREAK_MAX_GAP_DAYS {
            break;
        }
        streak += 1;
    }
    streak
}

/// Compute the all-time statistics card
///
/// Every record is a visit. Only closed sessions contribute to the hour
/// total and the average duration.
pub fn compute_attendance_stats(records: &[AttendanceRecord]) -> AttendanceStats {
    let (closed, minutes) = records
        .iter()
        .filter(|r| !r.is_open())
        .fold((0u32, 0i64), |(closed, minutes), r| {
            (closed.saturating_add(1), minutes.saturating_add(r.minutes()))
        });

    AttendanceStats {
        total_visits: u32::try_from(records.len()).unwrap_or(u32::MAX),
        total_hours: minutes as f64 / 60.0,
        average_duration_minutes: if closed > 0 {
            minutes as f64 / f64::from(closed)
        } else {
            0.0
        },
        current_streak_days: compute_streak(records),
    }
}

// ============================================================================
// Calendar
// ============================================================================

/// Calendar marker for a day with at least one visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPresence {
    /// A session on that day is still open
    Active,
    /// Every session on that day was checked out
    Completed,
}

impl From<AttendanceStatus> for DayPresence {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::CheckedIn => DayPresence::Active,
            AttendanceStatus::CheckedOut => DayPresence::Completed,
        }
    }
}

/// Map each visited day of `month`/`year` to its marker
///
/// Days without a visit are absent. When a day has several records, a
/// checked-in one marks it active regardless of order. An out-of-range month
/// yields an empty map.
pub fn build_calendar_presence(
    records: &[AttendanceRecord],
    month: u32,
    year: i32,
) -> BTreeMap<u32, DayPresence> {
    let mut days = BTreeMap::new();
    if !(1..=12).contains(&month) {
        return days;
    }

    for record in records {
        let Some(date) = record.date else { continue };
        if date.year() != year || date.month() != month {
            continue;
        }
        let presence = DayPresence::from(record.status);
        days.entry(date.day())
            .and_modify(|existing| {
                if presence == DayPresence::Active {
                    *existing = DayPresence::Active;
                }
            })
            .or_insert(presence);
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn closed(date: &str, minutes: i64) -> AttendanceRecord {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let check_in = date.and_hms_opt(7, 0, 0).unwrap().and_utc();
        AttendanceRecord {
            id: Uuid::new_v4(),
            date: Some(date),
            check_in,
            check_out: Some(check_in + Duration::minutes(minutes)),
            duration_minutes: Some(minutes),
            status: AttendanceStatus::CheckedOut,
        }
    }

    fn open(date: &str) -> AttendanceRecord {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        AttendanceRecord {
            id: Uuid::new_v4(),
            date: Some(date),
            check_in: date.and_hms_opt(18, 0, 0).unwrap().and_utc(),
            check_out: None,
            duration_minutes: None,
            status: AttendanceStatus::CheckedIn,
        }
    }

    fn undated() -> AttendanceRecord {
        AttendanceRecord {
            date: None,
            ..closed("2024-01-01", 45)
        }
    }

    // =========================================================================
    // Streak Tests
    // =========================================================================

    #[test]
    fn test_streak_empty() {
        assert_eq!(compute_streak(&[]), 0);
    }

    #[test]
    fn test_streak_gap_of_exactly_seven_days_continues() {
        let records = vec![closed("2024-01-01", 60), closed("2024-01-08", 90)];
        assert_eq!(compute_streak(&records), 2);
    }

    #[test]
    fn test_streak_stops_at_first_long_gap() {
        let records = vec![
            closed("2024-01-01", 60),
            closed("2024-01-08", 90),
            closed("2024-01-20", 30),
        ];
        // newest run is just 2024-01-20; the 12-day gap ends it
        assert_eq!(compute_streak(&records), 1);

        let records = vec![
            closed("2023-12-01", 60),
            closed("2024-01-01", 60),
            closed("2024-01-08", 90),
        ];
        assert_eq!(compute_streak(&records), 2);
    }

    #[test]
    fn test_streak_ignores_input_order() {
        let records = vec![
            closed("2024-01-08", 90),
            closed("2023-12-01", 60),
            closed("2024-01-01", 60),
        ];
        assert_eq!(compute_streak(&records), 2);
    }

    #[test]
    fn test_streak_counts_same_day_records() {
        let records = vec![
            closed("2024-01-01", 30),
            closed("2024-01-01", 40),
            open("2024-01-02"),
        ];
        assert_eq!(compute_streak(&records), 3);
    }

    #[test]
    fn test_streak_skips_undated_records() {
        assert_eq!(compute_streak(&[undated()]), 0);
        let records = vec![undated(), closed("2024-01-01", 60), undated()];
        assert_eq!(compute_streak(&records), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A streak never exceeds the number of dated records
        #[test]
        fn prop_streak_bounded(offsets in prop::collection::vec(0i64..400, 0..40)) {
            let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            let records: Vec<AttendanceRecord> = offsets
                .iter()
                .map(|o| {
                    let day = base + Duration::days(*o);
                    closed(&day.format("%Y-%m-%d").to_string(), 30)
                })
                .collect();
            let streak = compute_streak(&records);
            prop_assert!(streak as usize <= records.len());
            prop_assert_eq!(streak == 0, records.is_empty());
        }
    }

    // =========================================================================
    // Weekly Summary Tests
    // =========================================================================

    #[test]
    fn test_weekly_summary_empty() {
        let summary = compute_weekly_summary(&[], Utc::now());
        assert_eq!(summary, WeeklySummary::default());
        assert_eq!(summary.avg_duration_minutes, 0.0);
    }

    #[test]
    fn test_weekly_summary_window() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let records = vec![
            closed("2024-01-15", 60),
            closed("2024-01-09", 90),
            // midnight of the 8th is before now - 7 days (8th, 12:00)
            closed("2024-01-08", 120),
            open("2024-01-14"),
            undated(),
        ];

        let summary = compute_weekly_summary(&records, now);
        assert_eq!(summary.visits, 3);
        assert_eq!(summary.hours, 2.5);
        assert_eq!(summary.avg_duration_minutes, 50.0);
    }

    #[test]
    fn test_weekly_summary_includes_cutoff_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let summary = compute_weekly_summary(&[closed("2024-01-08", 30)], now);
        assert_eq!(summary.visits, 1);
    }

    // =========================================================================
    // Stats Tests
    // =========================================================================

    #[test]
    fn test_stats_exclude_open_sessions_from_durations() {
        let records = vec![
            closed("2024-01-01", 60),
            closed("2024-01-03", 90),
            open("2024-01-05"),
        ];
        let stats = compute_attendance_stats(&records);
        assert_eq!(stats.total_visits, 3);
        assert_eq!(stats.total_hours, 2.5);
        assert_eq!(stats.average_duration_minutes, 75.0);
        assert_eq!(stats.current_streak_days, 3);
    }

    #[test]
    fn test_stats_tolerate_missing_duration() {
        let mut broken = closed("2024-01-02", 60);
        broken.duration_minutes = None;
        let stats = compute_attendance_stats(&[broken, closed("2024-01-01", 60)]);
        assert_eq!(stats.total_hours, 1.0);
        assert_eq!(stats.average_duration_minutes, 30.0);
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(compute_attendance_stats(&[]), AttendanceStats::default());
    }

    // =========================================================================
    // Calendar Tests
    // =========================================================================

    #[test]
    fn test_huge_stored_duration_saturates() {
        let json = r#"[
            {"id": "6f1c8b1e-8d1a-4a56-9c1e-0000000000a1", "date": "2024-01-14",
             "check_in": "2024-01-14T07:00:00Z", "check_out": "2024-01-14T08:00:00Z",
             "duration_minutes": 9223372036854775807, "status": "checked-out"},
            {"id": "6f1c8b1e-8d1a-4a56-9c1e-0000000000a2", "date": "2024-01-13",
             "check_in": "2024-01-13T07:00:00Z", "check_out": "2024-01-13T08:00:00Z",
             "duration_minutes": 60, "status": "checked-out"}
        ]"#;
        let records = parse_records(json).unwrap();

        let stats = compute_attendance_stats(&records);
        assert_eq!(stats.total_visits, 2);
        assert_eq!(stats.total_hours, i64::MAX as f64 / 60.0);

        let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let weekly = compute_weekly_summary(&records, now);
        assert_eq!(weekly.visits, 2);
        assert!(weekly.hours.is_finite());
    }

    #[test]
    fn test_calendar_presence() {
        let records = vec![
            closed("2024-02-01", 60),
            open("2024-02-14"),
            closed("2024-03-01", 60),
            undated(),
        ];
        let days = build_calendar_presence(&records, 2, 2024);
        assert_eq!(days.len(), 2);
        assert_eq!(days[&1], DayPresence::Completed);
        assert_eq!(days[&14], DayPresence::Active);
    }

    #[test]
    fn test_calendar_checked_in_wins_any_order() {
        let a = vec![open("2024-02-14"), closed("2024-02-14", 30)];
        let b = vec![closed("2024-02-14", 30), open("2024-02-14")];
        assert_eq!(build_calendar_presence(&a, 2, 2024)[&14], DayPresence::Active);
        assert_eq!(build_calendar_presence(&b, 2, 2024)[&14], DayPresence::Active);
    }

    #[test]
    fn test_calendar_invalid_month() {
        let records = vec![closed("2024-02-01", 60)];
        assert!(build_calendar_presence(&records, 0, 2024).is_empty());
        assert!(build_calendar_presence(&records, 13, 2024).is_empty());
    }

    // =========================================================================
    // Deserialization Tests
    // =========================================================================

    #[test]
    fn test_record_deserializes_store_payload() {
        let json = r#"{
            "id": "7f1c1b52-4a0e-4d6b-9d0c-0a4b7c1f2e3d",
            "date": "2024-01-08T00:00:00.000Z",
            "check_in": "2024-01-08T07:00:00Z",
            "check_out": "2024-01-08T08:30:00Z",
            "duration_minutes": 90,
            "status": "checked-out"
        }"#;
        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 8));
        assert_eq!(record.status, AttendanceStatus::CheckedOut);
        assert!(!record.is_open());
    }

    #[test]
    fn test_record_with_malformed_date_is_kept_undated() {
        let json = r#"{
            "id": "7f1c1b52-4a0e-4d6b-9d0c-0a4b7c1f2e3d",
            "date": "not-a-date",
            "check_in": "2024-01-08T07:00:00Z",
            "status": "checked-in"
        }"#;
        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.date, None);
        assert!(record.is_open());
        assert_eq!(record.minutes(), 0);
    }

    #[test]
    fn test_parse_records_rejects_non_array() {
        assert!(parse_records("[]").unwrap().is_empty());
        assert!(matches!(parse_records("{}"), Err(PayloadError::Json(_))));
    }

    #[test]
    fn test_status_round_trips_as_kebab_case() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::CheckedIn).unwrap(),
            "\"checked-in\""
        );
        assert_eq!("checked-out".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::CheckedOut);
    }
}

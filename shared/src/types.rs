//! API request and response types

use crate::attendance::{AttendanceRecord, AttendanceStats, DayPresence, WeeklySummary};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of attendance records returned per history request
pub const DEFAULT_HISTORY_LIMIT: i64 = 30;

/// Upper bound on attendance records per history request
pub const MAX_HISTORY_LIMIT: i64 = 365;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ============================================================================
// Authentication Types
// ============================================================================

/// Authentication tokens response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// User profile response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Attendance Types
// ============================================================================

/// Today's attendance, `null` when the member has not checked in today
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayAttendanceResponse {
    pub attendance: Option<AttendanceRecord>,
}

/// Attendance history query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceHistoryQuery {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl AttendanceHistoryQuery {
    /// Resolve the requested limit, clamped to `1..=max`
    pub fn effective_limit(&self, default: i64, max: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, max.max(1))
    }
}

/// A member's attendance history plus derived statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAttendanceResponse {
    pub attendance: Vec<AttendanceRecord>,
    pub stats: AttendanceStats,
}

/// Dashboard summary cards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSummaryResponse {
    pub weekly: WeeklySummary,
    pub stats: AttendanceStats,
}

/// Calendar query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarQuery {
    pub month: u32,
    pub year: i32,
}

/// Calendar markers for one month, keyed by day of month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub month: u32,
    pub year: i32,
    pub days: BTreeMap<u32, DayPresence>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_limit_defaults_and_clamps() {
        let default = AttendanceHistoryQuery::default();
        assert_eq!(
            default.effective_limit(DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT),
            DEFAULT_HISTORY_LIMIT
        );

        let query = AttendanceHistoryQuery {
            start_date: None,
            limit: Some(10_000),
        };
        assert_eq!(query.effective_limit(DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT), MAX_HISTORY_LIMIT);

        let query = AttendanceHistoryQuery {
            start_date: None,
            limit: Some(0),
        };
        assert_eq!(query.effective_limit(DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT), 1);
    }

    #[test]
    fn test_calendar_response_serializes_day_keys() {
        let mut days = BTreeMap::new();
        days.insert(3, DayPresence::Completed);
        let response = CalendarResponse {
            month: 2,
            year: 2024,
            days,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["days"]["3"], "completed");
    }
}

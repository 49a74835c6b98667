//! Gym Dashboard WASM module
//!
//! Browser bindings for the calculator and attendance analytics, so the
//! dashboard can recompute on every keystroke without a round trip.
//! Structured values cross the boundary as JSON strings; timestamps as
//! milliseconds since the Unix epoch.

use chrono::{DateTime, Utc};
use gym_dashboard_shared::attendance::{self, parse_records};
use gym_dashboard_shared::health_metrics::{self, AnthropometricInput, Gender};
use gym_dashboard_shared::{ActivityLevel, AuthTokens, SessionContext};
use wasm_bindgen::prelude::*;

// ============================================================================
// Metrics
// ============================================================================

/// BMI rounded to one decimal, `NaN` for a non-positive height
#[wasm_bindgen]
pub fn compute_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    health_metrics::compute_bmi(height_cm, weight_kg)
}

/// Category label for a BMI value, empty for `NaN`
#[wasm_bindgen]
pub fn classify_bmi(bmi: f64) -> String {
    if bmi.is_nan() {
        return String::new();
    }
    health_metrics::classify_bmi(bmi).label().to_string()
}

#[wasm_bindgen]
pub fn compute_body_fat(
    is_male: bool,
    waist_cm: f64,
    neck_cm: f64,
    hip_cm: f64,
    height_cm: f64,
) -> f64 {
    health_metrics::compute_body_fat(gender(is_male), waist_cm, neck_cm, hip_cm, height_cm)
}

/// TDEE in whole kcal; an unknown activity level counts as moderate
#[wasm_bindgen]
pub fn compute_tdee(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    is_male: bool,
    activity_level: &str,
) -> i64 {
    let level = activity_level.parse::<ActivityLevel>().unwrap_or_default();
    health_metrics::compute_tdee(weight_kg, height_cm, age_years, gender(is_male), level)
}

/// Full calculator result for a JSON form snapshot
#[wasm_bindgen]
pub fn compute_metrics(input_json: &str) -> Result<String, JsError> {
    metrics_json(input_json).map_err(|e| JsError::new(&e))
}

/// Placeholder-aware display string for a metric
#[wasm_bindgen]
pub fn format_metric(value: f64, decimals: usize) -> String {
    health_metrics::format_metric(value, decimals)
}

fn gender(is_male: bool) -> Gender {
    if is_male {
        Gender::Male
    } else {
        Gender::Female
    }
}

fn metrics_json(input_json: &str) -> Result<String, String> {
    let input: AnthropometricInput =
        serde_json::from_str(input_json).map_err(|e| format!("Invalid metrics input: {}", e))?;
    serde_json::to_string(&health_metrics::compute_metrics(&input)).map_err(|e| e.to_string())
}

// ============================================================================
// Attendance
// ============================================================================

/// Streak over a JSON array of attendance records
#[wasm_bindgen]
pub fn compute_streak(records_json: &str) -> Result<u32, JsError> {
    let records = parse_records(records_json).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(attendance::compute_streak(&records))
}

/// Weekly summary as JSON
#[wasm_bindgen]
pub fn compute_weekly_summary(records_json: &str, now_ms: f64) -> Result<String, JsError> {
    weekly_summary_json(records_json, now_ms).map_err(|e| JsError::new(&e))
}

/// All-time stats as JSON
#[wasm_bindgen]
pub fn compute_attendance_stats(records_json: &str) -> Result<String, JsError> {
    stats_json(records_json).map_err(|e| JsError::new(&e))
}

/// Calendar markers as a JSON object keyed by day of month
#[wasm_bindgen]
pub fn build_calendar_presence(records_json: &str, month: u32, year: i32) -> Result<String, JsError> {
    calendar_json(records_json, month, year).map_err(|e| JsError::new(&e))
}

fn timestamp(ms: f64) -> Result<DateTime<Utc>, String> {
    if !ms.is_finite() {
        return Err(format!("Invalid timestamp: {}", ms));
    }
    DateTime::from_timestamp_millis(ms as i64).ok_or_else(|| format!("Invalid timestamp: {}", ms))
}

fn weekly_summary_json(records_json: &str, now_ms: f64) -> Result<String, String> {
    let records = parse_records(records_json).map_err(|e| e.to_string())?;
    let summary = attendance::compute_weekly_summary(&records, timestamp(now_ms)?);
    serde_json::to_string(&summary).map_err(|e| e.to_string())
}

fn stats_json(records_json: &str) -> Result<String, String> {
    let records = parse_records(records_json).map_err(|e| e.to_string())?;
    serde_json::to_string(&attendance::compute_attendance_stats(&records)).map_err(|e| e.to_string())
}

fn calendar_json(records_json: &str, month: u32, year: i32) -> Result<String, String> {
    let records = parse_records(records_json).map_err(|e| e.to_string())?;
    let days = attendance::build_calendar_presence(&records, month, year);
    serde_json::to_string(&days).map_err(|e| e.to_string())
}

// ============================================================================
// Session
// ============================================================================

/// Browser-side session handle
///
/// The page owns one of these and passes it to whatever issues API calls.
#[wasm_bindgen]
#[derive(Default)]
pub struct DashboardSession {
    inner: SessionContext,
}

#[wasm_bindgen]
impl DashboardSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session from an `AuthTokens` JSON body
    pub fn establish(&mut self, tokens_json: &str, now_ms: f64) -> Result<(), JsError> {
        self.establish_json(tokens_json, now_ms)
            .map_err(|e| JsError::new(&e))
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    #[wasm_bindgen(js_name = isAuthenticated)]
    pub fn is_authenticated(&self, now_ms: f64) -> bool {
        timestamp(now_ms).is_ok_and(|now| self.inner.is_authenticated(now))
    }

    /// `Authorization` header value, or `undefined` when signed out or expired
    pub fn bearer(&self, now_ms: f64) -> Option<String> {
        let now = timestamp(now_ms).ok()?;
        self.inner.bearer(now).ok()
    }

    #[wasm_bindgen(js_name = refreshToken)]
    pub fn refresh_token(&self) -> Option<String> {
        self.inner.refresh_token().map(str::to_string)
    }

    /// Report an API status; returns `true` if the session was cleared
    #[wasm_bindgen(js_name = observeStatus)]
    pub fn observe_status(&mut self, status: u16) -> bool {
        self.inner.observe_status(status)
    }
}

impl DashboardSession {
    fn establish_json(&mut self, tokens_json: &str, now_ms: f64) -> Result<(), String> {
        let tokens: AuthTokens =
            serde_json::from_str(tokens_json).map_err(|e| format!("Invalid tokens: {}", e))?;
        self.inner.establish(tokens, timestamp(now_ms)?);
        Ok(())
    }
}

//! Body metrics calculator routes
//!
//! Public and stateless. Degenerate input produces `null` fields rather
//! than an error, matching what the calculator page shows.

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Json, Router,
};
use gym_dashboard_shared::health_metrics::{
    compute_metrics, ActivityLevel, AnthropometricInput, MetricsResult,
};
use serde::Serialize;

/// Create metrics routes
pub fn metrics_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(calculate))
        .route("/activity-levels", get(activity_levels))
}

/// POST /api/v1/metrics
async fn calculate(Json(input): Json<AnthropometricInput>) -> Json<MetricsResult> {
    Json(compute_metrics(&input))
}

/// One option of the activity level picker
#[derive(Debug, Serialize)]
pub struct ActivityLevelOption {
    pub level: ActivityLevel,
    pub multiplier: f64,
    pub description: &'static str,
}

/// GET /api/v1/metrics/activity-levels
async fn activity_levels() -> Json<Vec<ActivityLevelOption>> {
    Json(
        ActivityLevel::ALL
            .iter()
            .map(|level| ActivityLevelOption {
                level: *level,
                multiplier: level.multiplier(),
                description: level.description(),
            })
            .collect(),
    )
}

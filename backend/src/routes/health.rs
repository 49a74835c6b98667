//! Liveness and readiness checks
//!
//! `/health/live` answers as long as the process serves requests;
//! `/health/ready` also pings Postgres and returns 503 when it cannot.

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Alive,
    Ready,
    NotReady,
}

/// Health check response body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DependencyCheck>,
}

/// Result of pinging one dependency
#[derive(Debug, Serialize)]
pub struct DependencyCheck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    fn new(status: HealthStatus) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database: None,
        }
    }
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::new(HealthStatus::Healthy))
}

/// GET /health/live
pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse::new(HealthStatus::Alive))
}

/// GET /health/ready
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = match db::health_check(state.db()).await {
        Ok(elapsed) => DependencyCheck {
            ok: true,
            latency_ms: Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)),
            error: None,
        },
        Err(e) => DependencyCheck {
            ok: false,
            latency_ms: None,
            error: Some(e.to_string()),
        },
    };

    let (code, status) = if database.ok {
        (StatusCode::OK, HealthStatus::Ready)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::NotReady)
    };

    let mut body = HealthResponse::new(status);
    body.database = Some(database);
    (code, Json(body))
}

//! Application state management
//!
//! Shared resources handed to every request handler via Axum's state
//! extraction. Everything in here is cheap to clone and read-only once the
//! server is running.

use crate::auth::JwtService;
use crate::config::{AppConfig, AttendanceConfig};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (internally Arc'd)
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// JWT service with keys derived once at startup
    pub jwt: JwtService,
}

impl AppState {
    /// Create a new application state
    ///
    /// Derives the JWT keys from the configured secret, so call this once at
    /// startup.
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        let jwt = JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
        );

        Self {
            db,
            config: Arc::new(config),
            jwt,
        }
    }

    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// History limits and summary window for the attendance endpoints
    #[inline]
    pub fn attendance(&self) -> &AttendanceConfig {
        &self.config.attendance
    }
}

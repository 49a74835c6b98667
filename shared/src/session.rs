//! Client session context
//!
//! Holds the bearer token for the signed-in member. The context is an
//! ordinary value owned by whoever makes API calls and passed to them
//! explicitly; there is no process-wide token store.
//!
//! Lifecycle: [`SessionContext::establish`] at login, [`SessionContext::clear`]
//! at logout, and [`SessionContext::observe_status`] clears it when the API
//! answers 401.

use crate::errors::SessionError;
use crate::types::AuthTokens;
use chrono::{DateTime, Duration, Utc};

const UNAUTHORIZED: u16 = 401;

#[derive(Debug, Clone)]
struct ActiveSession {
    tokens: AuthTokens,
    expires_at: DateTime<Utc>,
}

/// Explicit session state for one signed-in member
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    active: Option<ActiveSession>,
}

impl SessionContext {
    /// Create a signed-out context
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session from freshly issued tokens
    pub fn establish(&mut self, tokens: AuthTokens, now: DateTime<Utc>) {
        let expires_at = now + Duration::seconds(tokens.expires_in);
        self.active = Some(ActiveSession { tokens, expires_at });
    }

    /// End the session
    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Whether a non-expired access token is held
    pub fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        self.active.as_ref().is_some_and(|s| now < s.expires_at)
    }

    /// `Authorization` header value for the current access token
    pub fn bearer(&self, now: DateTime<Utc>) -> Result<String, SessionError> {
        let session = self.active.as_ref().ok_or(SessionError::MissingToken)?;
        if now >= session.expires_at {
            return Err(SessionError::TokenExpired);
        }
        Ok(format!("Bearer {}", session.tokens.access_token))
    }

    /// Refresh token, kept even after the access token expires
    pub fn refresh_token(&self) -> Option<&str> {
        self.active.as_ref().map(|s| s.tokens.refresh_token.as_str())
    }

    /// Feed back an API response status; a 401 ends the session
    ///
    /// Returns `true` when the session was cleared.
    pub fn observe_status(&mut self, status: u16) -> bool {
        if status == UNAUTHORIZED && self.active.is_some() {
            self.clear();
            return true;
        }
        false
    }
}

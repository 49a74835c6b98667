//! Session extraction
//!
//! Handlers that take a [`MemberSession`] argument only run for requests
//! carrying a valid access token. The session is explicit request context;
//! there is no process-wide "current member".

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use uuid::Uuid;

/// Authenticated member extracted from the `Authorization` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberSession {
    pub user_id: Uuid,
}

impl MemberSession {
    /// Whether this session belongs to `user_id`
    #[inline]
    pub fn owns(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Pull the bearer token out of request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization format".to_string()))
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for MemberSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = bearer_token(&parts.headers)?;

        let claims = app_state
            .jwt()
            .validate_access_token(token)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {}", e)))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid member ID in token".to_string()))?;

        Ok(MemberSession { user_id })
    }
}

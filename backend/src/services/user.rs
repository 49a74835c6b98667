//! Member registration, login and token refresh
//!
//! Argon2 work runs on the blocking pool; token signing reuses the keys held
//! in `AppState`.

use crate::auth::{JwtService, PasswordService};
use crate::error::ApiError;
use crate::repositories::UserRepository;
use gym_dashboard_shared::types::{AuthTokens, UserProfile};
use gym_dashboard_shared::validation::{
    validate_email, validate_name, validate_password, ValidationError,
};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new member and sign them in
    pub async fn register(
        pool: &PgPool,
        jwt_service: &JwtService,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthTokens, ApiError> {
        let email = normalize_email(email);
        validate_email(&email).map_err(|m| ValidationError::new("email", &m))?;
        validate_password(password).map_err(|m| ValidationError::new("password", &m))?;
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        if let Some(name) = name {
            validate_name(name).map_err(|m| ValidationError::new("name", &m))?;
        }

        if UserRepository::email_exists(pool, &email)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = PasswordService::hash_async(password.to_string())
            .await
            .map_err(ApiError::Internal)?;

        let user = UserRepository::create(pool, &email, &password_hash, name)
            .await
            .map_err(ApiError::Internal)?;

        info!(user_id = %user.id, "Member registered");
        Self::issue_tokens(jwt_service, user.id)
    }

    /// Login with email and password
    pub async fn login(
        pool: &PgPool,
        jwt_service: &JwtService,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, ApiError> {
        let email = normalize_email(email);
        let user = UserRepository::find_by_email(pool, &email)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

        let valid = PasswordService::verify_async(password.to_string(), user.password_hash)
            .await
            .map_err(ApiError::Internal)?;

        if !valid {
            warn!(user_id = %user.id, "Login rejected");
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }

        Self::issue_tokens(jwt_service, user.id)
    }

    /// Exchange a refresh token for a fresh token pair
    pub async fn refresh_token(
        pool: &PgPool,
        jwt_service: &JwtService,
        refresh_token: &str,
    ) -> Result<AuthTokens, ApiError> {
        let claims = jwt_service
            .validate_refresh_token(refresh_token)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid refresh token: {}", e)))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid member ID in token".to_string()))?;

        UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("Member not found".to_string()))?;

        Self::issue_tokens(jwt_service, user_id)
    }

    /// Get the member's profile
    pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<UserProfile, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

        Ok(UserProfile {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        })
    }

    fn issue_tokens(jwt_service: &JwtService, user_id: Uuid) -> Result<AuthTokens, ApiError> {
        Ok(AuthTokens {
            access_token: jwt_service
                .generate_access_token(user_id)
                .map_err(ApiError::Internal)?,
            refresh_token: jwt_service
                .generate_refresh_token(user_id)
                .map_err(ApiError::Internal)?,
            token_type: "Bearer".to_string(),
            expires_in: jwt_service.access_token_expiry_secs(),
        })
    }
}

/// Emails are stored trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

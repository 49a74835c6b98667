//! Error types shared by the dashboard crates

use thiserror::Error;

/// Session error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Not signed in")]
    MissingToken,

    #[error("Token expired")]
    TokenExpired,
}

/// Errors raised while decoding store payloads
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

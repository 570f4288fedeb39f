//! Application error types
//!
//! Unified error handling for the entire application.

use std::fmt;

use guestbook_core::DomainError;
use serde::Serialize;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authentication")]
    MissingAuth,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    // Rate limiting
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // Storage / other collaborators
    #[error("Upstream failure: {0}")]
    Upstream(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::Validation(_) => 400,

            // 401 Unauthorized
            Self::InvalidToken | Self::TokenExpired | Self::MissingAuth => 401,

            // 403 Forbidden
            Self::Forbidden(_) => 403,

            // 404 Not Found
            Self::NotFound(_) => 404,

            // 409 Conflict
            Self::InvalidState(_) => 409,

            // 429 Too Many Requests
            Self::RateLimitExceeded => 429,

            // 502 Bad Gateway
            Self::Upstream(_) => 502,

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal(_) | Self::Config(_) => 500,

            Self::Domain(e) => domain_status(e),
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::MissingAuth => "MISSING_AUTH",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Upstream(_) => "UPSTREAM_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code())
    }

    /// Create a not found error for a resource type
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    /// Create a validation error
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

fn domain_status(e: &DomainError) -> u16 {
    if e.is_not_found() {
        404
    } else if e.is_authorization() {
        403
    } else if e.is_validation() {
        400
    } else if e.is_invalid_state() || e.is_conflict() {
        409
    } else if e.is_exhausted() {
        503
    } else if matches!(e, DomainError::StorageError(_)) {
        502
    } else {
        500
    }
}

/// Error response structure for API responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
            details: None,
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

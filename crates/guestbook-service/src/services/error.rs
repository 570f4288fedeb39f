//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use std::fmt;

use guestbook_common::AppError;
use guestbook_core::DomainError;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation or repository failure
    Domain(DomainError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Caller is not allowed to touch the resource
    Forbidden(String),

    /// Validation error
    Validation(String),

    /// Target exists but cannot accept the operation right now
    InvalidState(String),

    /// A collaborator (blob storage) failed
    Upstream(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::InvalidState(msg) => write!(f, "Invalid state: {msg}"),
            Self::Upstream(msg) => write!(f, "Upstream failure: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create an upstream error
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => {
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
            Self::NotFound { .. } => 404,
            Self::Forbidden(_) => 403,
            Self::Validation(_) => 400,
            Self::InvalidState(_) => 409,
            Self::Upstream(_) => 502,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Upstream(_) => "UPSTREAM_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::Forbidden(msg) => AppError::Forbidden(msg),
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::InvalidState(msg) => AppError::InvalidState(msg),
            ServiceError::Upstream(msg) => AppError::Upstream(msg),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

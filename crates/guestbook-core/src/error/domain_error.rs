//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::generation::CodeKind;
use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Event not found: {0}")]
    EventNotFound(Snowflake),

    #[error("No event uses access code {0}")]
    AccessCodeNotFound(String),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Media file not found: {0}")]
    MediaFileNotFound(Snowflake),

    #[error("Guest token not found: {0}")]
    GuestTokenNotFound(Snowflake),

    #[error("Upload slot not found or already used")]
    UploadSlotNotFound,

    #[error("Stored file not found: {0}")]
    BlobNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid access code: {0:?}")]
    InvalidAccessCode(String),

    #[error("File too large: max {max_bytes} bytes")]
    FileTooLarge { max_bytes: u64 },

    #[error("Invalid storage id: {0:?}")]
    InvalidStorageId(String),

    // =========================================================================
    // Invalid State Errors
    // =========================================================================
    #[error("Event is not active: {0}")]
    EventInactive(Snowflake),

    #[error("Guest token is inactive")]
    TokenInactive,

    #[error("Guest token has expired")]
    TokenExpired,

    #[error("Media pipeline cannot apply {event} in stage {from}")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },

    #[error("Media file {0} changed concurrently")]
    StageConflict(Snowflake),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Only the event host can do this")]
    NotEventHost,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Generated {0} is already taken")]
    DuplicateCode(CodeKind),

    #[error("Could not find a free {kind} after {attempts} attempts")]
    ConflictExhausted { kind: CodeKind, attempts: u32 },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::EventNotFound(_) | Self::AccessCodeNotFound(_) => "UNKNOWN_EVENT",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::MediaFileNotFound(_) => "UNKNOWN_MEDIA_FILE",
            Self::GuestTokenNotFound(_) => "UNKNOWN_GUEST_TOKEN",
            Self::UploadSlotNotFound => "UNKNOWN_UPLOAD_SLOT",
            Self::BlobNotFound(_) => "UNKNOWN_FILE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidAccessCode(_) => "INVALID_ACCESS_CODE",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::InvalidStorageId(_) => "INVALID_STORAGE_ID",

            // Invalid state
            Self::EventInactive(_) => "EVENT_INACTIVE",
            Self::TokenInactive => "TOKEN_INACTIVE",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidTransition { .. } => "INVALID_PIPELINE_TRANSITION",
            Self::StageConflict(_) => "PIPELINE_STAGE_CONFLICT",

            // Authorization
            Self::NotEventHost => "NOT_EVENT_HOST",

            // Conflict
            Self::DuplicateCode(_) => "DUPLICATE_CODE",
            Self::ConflictExhausted { .. } => "CONFLICT_EXHAUSTED",

            // Infrastructure
            Self::StorageError(_) => "UPSTREAM_FAILURE",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::EventNotFound(_)
                | Self::AccessCodeNotFound(_)
                | Self::MessageNotFound(_)
                | Self::MediaFileNotFound(_)
                | Self::GuestTokenNotFound(_)
                | Self::UploadSlotNotFound
                | Self::BlobNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidAccessCode(_)
                | Self::FileTooLarge { .. }
                | Self::InvalidStorageId(_)
        )
    }

    /// Check if the target exists but is in the wrong state
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            Self::EventInactive(_)
                | Self::TokenInactive
                | Self::TokenExpired
                | Self::InvalidTransition { .. }
                | Self::StageConflict(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotEventHost)
    }

    /// Check if this is a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateCode(_))
    }

    /// Check if the uniqueness guard ran out of attempts
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::ConflictExhausted { .. })
    }

    /// Check if a collaborator (storage, database) failed
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::StorageError(_) | Self::DatabaseError(_) | Self::InternalError(_)
        )
    }
}

//! Error handling utilities for repositories

use guestbook_core::error::DomainError;
use guestbook_core::value_objects::Snowflake;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

pub fn event_not_found(id: Snowflake) -> DomainError {
    DomainError::EventNotFound(id)
}

pub fn message_not_found(id: Snowflake) -> DomainError {
    DomainError::MessageNotFound(id)
}

pub fn media_file_not_found(id: Snowflake) -> DomainError {
    DomainError::MediaFileNotFound(id)
}

pub fn guest_token_not_found(id: Snowflake) -> DomainError {
    DomainError::GuestTokenNotFound(id)
}

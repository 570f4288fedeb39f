//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use chrono::{DateTime, NaiveDate, Utc};
use guestbook_core::entities::{EventChanges, MessageType};
use guestbook_core::PipelineStage;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::services::{ServiceError, ServiceResult};

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`)
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> ServiceResult<()> {
    match value {
        Some(value) if value.chars().count() > max => Err(ServiceError::validation(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}

// ============================================================================
// Event Requests
// ============================================================================

/// Create event request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub date: NaiveDate,

    #[validate(length(max = 300, message = "Location must be at most 300 characters"))]
    pub location: Option<String>,
}

/// Update event request. `null` clears description or location.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,

    pub date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "nullable")]
    pub location: Option<Option<String>>,

    pub is_active: Option<bool>,
}

impl UpdateEventRequest {
    /// Convert into domain changes, checking the nullable fields
    pub fn into_changes(self) -> ServiceResult<EventChanges> {
        check_len("description", self.description.as_ref().and_then(Option::as_deref), 2000)?;
        check_len("location", self.location.as_ref().and_then(Option::as_deref), 300)?;

        Ok(EventChanges {
            title: self.title,
            description: self.description,
            date: self.date,
            location: self.location,
            is_active: self.is_active,
        })
    }
}

// ============================================================================
// Message Requests
// ============================================================================

/// Guest message submission
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitMessageRequest {
    #[validate(length(min = 1, max = 100, message = "Guest name must be 1-100 characters"))]
    pub guest_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub guest_email: Option<String>,

    #[validate(length(max = 5000, message = "Message must be at most 5000 characters"))]
    pub message_text: Option<String>,

    pub message_type: MessageType,
}

// ============================================================================
// Media Requests
// ============================================================================

/// Metadata for a file about to be uploaded
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitMediaRequest {
    #[validate(length(min = 1, max = 255, message = "File name must be 1-255 characters"))]
    pub file_name: String,

    /// Size in bytes
    pub file_size: i64,

    #[validate(length(min = 1, max = 127, message = "MIME type must be 1-127 characters"))]
    pub mime_type: String,

    /// Seconds, for audio and video
    #[validate(range(min = 0.0, message = "Duration must not be negative"))]
    pub duration: Option<f64>,

    #[validate(url(message = "Invalid thumbnail URL"))]
    pub thumbnail_url: Option<String>,
}

/// Attach an uploaded blob to its media row
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FinalizeMediaRequest {
    #[serde(default)]
    pub storage_id: String,
}

/// Client-side pipeline failure
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReportFailureRequest {
    /// Defaults to the step the row is currently in
    pub stage: Option<PipelineStage>,

    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: String,
}

// ============================================================================
// Guest Token Requests
// ============================================================================

/// Create guest token request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateGuestTokenRequest {
    #[validate(email(message = "Invalid email format"))]
    pub guest_email: Option<String>,

    /// Omit for a token that never expires
    pub expires_at: Option<DateTime<Utc>>,
}

/// Create shareable link request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateShareLinkRequest {
    #[validate(email(message = "Invalid email format"))]
    pub guest_email: Option<String>,

    #[validate(range(min = 1, max = 365, message = "Expiry must be 1-365 days"))]
    pub expires_in_days: Option<u32>,
}

/// Replace or clear a token's expiry
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTokenExpirationRequest {
    pub expires_at: Option<DateTime<Utc>>,
}

/// Guest token check
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ValidateTokenRequest {
    #[validate(length(min = 1, max = 64, message = "Token must be 1-64 characters"))]
    pub token: String,
}

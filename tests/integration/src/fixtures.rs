//! Test fixtures and data generators
//!
//! Request bodies the tests send and the response shapes they read back.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Host identity that no other test run shares
pub fn unique_host() -> String {
    format!(
        "host-{}-{}",
        chrono::Utc::now().timestamp_micros(),
        unique_suffix()
    )
}

// ============================================================================
// Requests
// ============================================================================

/// Create event request
#[derive(Debug, Serialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub location: Option<String>,
}

impl CreateEventRequest {
    pub fn unique() -> Self {
        Self {
            title: format!("Wedding {}", unique_suffix()),
            description: Some("Ceremony in the garden".to_string()),
            date: "2026-06-20".to_string(),
            location: Some("Rose Hall".to_string()),
        }
    }
}

/// Submit message request
#[derive(Debug, Serialize)]
pub struct SubmitMessageRequest {
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub message_text: Option<String>,
    pub message_type: String,
}

impl SubmitMessageRequest {
    pub fn text(body: &str) -> Self {
        Self {
            guest_name: format!("Guest {}", unique_suffix()),
            guest_email: Some("guest@example.com".to_string()),
            message_text: Some(body.to_string()),
            message_type: "text".to_string(),
        }
    }

    pub fn photo() -> Self {
        Self {
            guest_name: format!("Guest {}", unique_suffix()),
            guest_email: None,
            message_text: None,
            message_type: "photo".to_string(),
        }
    }
}

/// Submit media metadata request
#[derive(Debug, Serialize)]
pub struct SubmitMediaRequest {
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
}

impl SubmitMediaRequest {
    pub fn jpeg(size: usize) -> Self {
        Self {
            file_name: "toast.jpg".to_string(),
            file_size: size as i64,
            mime_type: "image/jpeg".to_string(),
        }
    }
}

/// Finalize request
#[derive(Debug, Serialize)]
pub struct FinalizeRequest {
    pub storage_id: String,
}

/// Token check request
#[derive(Debug, Serialize)]
pub struct ValidateTokenRequest {
    pub token: String,
}

// ============================================================================
// Responses
// ============================================================================

/// Event response
#[derive(Debug, Deserialize)]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub host_id: String,
    pub access_code: String,
    pub is_active: bool,
}

/// Message response
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    pub event_id: String,
    pub guest_email: Option<String>,
    pub is_approved: bool,
    pub media_files: Vec<MediaFileResponse>,
}

/// Reject response
#[derive(Debug, Deserialize)]
pub struct RejectMessageResponse {
    pub deleted_media_files: u64,
}

/// Media file response
#[derive(Debug, Deserialize)]
pub struct MediaFileResponse {
    pub id: String,
    pub stage: String,
    pub storage_url: Option<String>,
}

/// Upload URL response
#[derive(Debug, Deserialize)]
pub struct UploadUrlResponse {
    pub upload_url: String,
}

/// Upload response
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub storage_id: String,
    pub size: u64,
}

/// Created token response
#[derive(Debug, Deserialize)]
pub struct CreatedTokenResponse {
    pub id: String,
    pub token: String,
}

/// Share link response
#[derive(Debug, Deserialize)]
pub struct ShareLinkResponse {
    pub token: String,
    pub shareable_url: String,
}

/// Token validation response
#[derive(Debug, Deserialize)]
pub struct TokenValidationResponse {
    pub valid: bool,
    pub reason: Option<String>,
    pub event: Option<EventResponse>,
}

/// Error body
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

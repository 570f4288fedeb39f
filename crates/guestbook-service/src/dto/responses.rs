//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, NaiveDate, Utc};
use guestbook_core::entities::{InvalidReason, MessageType};
use serde::Serialize;

// ============================================================================
// Event Responses
// ============================================================================

/// Event response
#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub location: Option<String>,
    pub host_id: String,
    pub access_code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Message Responses
// ============================================================================

/// Message with its media files
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub event_id: String,
    pub guest_name: String,
    /// Only shown to the event host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_email: Option<String>,
    pub message_text: Option<String>,
    pub message_type: MessageType,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub media_files: Vec<MediaFileResponse>,
}

/// Result of rejecting a message
#[derive(Debug, Clone, Serialize)]
pub struct RejectMessageResponse {
    pub message_id: String,
    pub deleted_media_files: u64,
}

/// Just enough of a message to label a media file
#[derive(Debug, Clone, Serialize)]
pub struct MessageSummary {
    pub id: String,
    pub guest_name: String,
    pub message_type: MessageType,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Media Responses
// ============================================================================

/// Media file response
#[derive(Debug, Clone, Serialize)]
pub struct MediaFileResponse {
    pub id: String,
    pub message_id: String,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub storage_url: Option<String>,
    pub duration: Option<f64>,
    pub thumbnail_url: Option<String>,
    /// Persisted pipeline stage
    pub stage: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Media file together with the message it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct MediaWithMessageResponse {
    #[serde(flatten)]
    pub media: MediaFileResponse,
    pub message: MessageSummary,
}

/// Write-once upload target
#[derive(Debug, Clone, Serialize)]
pub struct UploadUrlResponse {
    pub media_id: String,
    pub upload_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of a binary upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub media_id: String,
    pub storage_id: String,
    pub size: u64,
}

/// A stored file ready to be streamed back
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

// ============================================================================
// Guest Token Responses
// ============================================================================

/// Guest token as the host sees it
#[derive(Debug, Clone, Serialize)]
pub struct GuestTokenResponse {
    pub id: String,
    pub event_id: String,
    pub token: String,
    pub guest_email: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Freshly issued token
#[derive(Debug, Clone, Serialize)]
pub struct CreatedTokenResponse {
    pub id: String,
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Freshly issued token with its guest link
#[derive(Debug, Clone, Serialize)]
pub struct ShareLinkResponse {
    pub id: String,
    pub token: String,
    pub shareable_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Outcome of a token check
#[derive(Debug, Clone, Serialize)]
pub struct TokenValidationResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<InvalidReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_email: Option<String>,
}

// ============================================================================
// Maintenance Responses
// ============================================================================

/// Expired token cleanup result
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CleanupResponse {
    pub deleted_count: u64,
}

/// Incomplete media sweep result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepOutcome {
    pub media_deleted: u64,
    pub blobs_deleted: u64,
}

/// Everything one maintenance pass removed
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MaintenanceReport {
    pub media_deleted: u64,
    pub blobs_deleted: u64,
    pub expired_slots_purged: u64,
    pub expired_tokens_deleted: u64,
}

impl MaintenanceReport {
    pub fn is_empty(&self) -> bool {
        self.media_deleted == 0
            && self.blobs_deleted == 0
            && self.expired_slots_purged == 0
            && self.expired_tokens_deleted == 0
    }
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_token_serialization() {
        let response = TokenValidationResponse {
            valid: false,
            reason: Some(InvalidReason::EventInactive),
            event: None,
            guest_email: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["reason"], "event_inactive");
        assert!(json.get("event").is_none());
    }

    #[test]
    fn test_readiness_response() {
        let ready = ReadinessResponse::ready(true);
        assert!(ready.is_ready());
        assert_eq!(ready.checks.database, "healthy");

        let not_ready = ReadinessResponse::ready(false);
        assert_eq!(not_ready.status, "not_ready");
        assert_eq!(not_ready.checks.database, "unhealthy");
    }

    #[test]
    fn test_maintenance_report_is_empty() {
        assert!(MaintenanceReport::default().is_empty());
        let report = MaintenanceReport {
            expired_tokens_deleted: 1,
            ..MaintenanceReport::default()
        };
        assert!(!report.is_empty());
    }
}

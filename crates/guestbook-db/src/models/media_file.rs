//! Media file database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for media_files table
#[derive(Debug, Clone, FromRow)]
pub struct MediaFileModel {
    pub id: i64,
    pub message_id: i64,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub storage_ref: Option<String>,
    pub storage_url: Option<String>,
    pub duration: Option<f64>,
    pub thumbnail_url: Option<String>,
    pub stage: String,
    pub failed_stage: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaFileModel {
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.stage == "finalized"
    }
}

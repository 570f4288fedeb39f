//! Message database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub event_id: i64,
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub message_text: Option<String>,
    pub message_type: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

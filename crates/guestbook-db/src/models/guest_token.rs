//! Guest token database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for guest_tokens table
#[derive(Debug, Clone, FromRow)]
pub struct GuestTokenModel {
    pub id: i64,
    pub event_id: i64,
    pub token: String,
    pub guest_email: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

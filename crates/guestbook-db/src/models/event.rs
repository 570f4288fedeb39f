//! Event database model

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database model for events table
#[derive(Debug, Clone, FromRow)]
pub struct EventModel {
    pub id: i64,
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

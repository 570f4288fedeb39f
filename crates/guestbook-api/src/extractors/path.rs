//! Path parameter extractors
//!
//! Ids travel as decimal strings and are parsed into Snowflakes here so a
//! malformed id is a 400 rather than a 404.

use guestbook_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

/// Parse a Snowflake path segment, naming the parameter on failure
pub fn parse_id(raw: &str, name: &str) -> Result<Snowflake, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid {name} format")))
}

/// Path parameters with event_id
#[derive(Debug, Deserialize)]
pub struct EventIdPath {
    pub event_id: String,
}

impl EventIdPath {
    /// Parse event_id as Snowflake
    pub fn event_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.event_id, "event_id")
    }
}

/// Path parameters with message_id
#[derive(Debug, Deserialize)]
pub struct MessageIdPath {
    pub message_id: String,
}

impl MessageIdPath {
    /// Parse message_id as Snowflake
    pub fn message_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.message_id, "message_id")
    }
}

/// Path parameters with media_id
#[derive(Debug, Deserialize)]
pub struct MediaIdPath {
    pub media_id: String,
}

impl MediaIdPath {
    /// Parse media_id as Snowflake
    pub fn media_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.media_id, "media_id")
    }
}

/// Path parameters with token_id
#[derive(Debug, Deserialize)]
pub struct TokenIdPath {
    pub token_id: String,
}

impl TokenIdPath {
    /// Parse token_id as Snowflake
    pub fn token_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.token_id, "token_id")
    }
}

/// Upload slot token from an issued upload URL
#[derive(Debug, Deserialize)]
pub struct UploadSlotPath {
    pub slot: String,
}

/// Opaque blob storage id
#[derive(Debug, Deserialize)]
pub struct StorageIdPath {
    pub storage_id: String,
}

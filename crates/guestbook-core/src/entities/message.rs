//! Message entity - a guest's entry in an event's guestbook

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Kind of content a guest submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Audio,
    Video,
    Photo,
    Media,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Photo => "photo",
            Self::Media => "media",
        }
    }

    /// Whether the message carries an uploaded file rather than only text
    #[inline]
    pub fn carries_media(self) -> bool {
        !matches!(self, Self::Text)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            "photo" => Ok(Self::Photo),
            "media" => Ok(Self::Media),
            other => Err(DomainError::ValidationError(format!(
                "unknown message type: {other}"
            ))),
        }
    }
}

/// Which messages a listing should include
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFilter {
    #[default]
    All,
    Approved,
    Pending,
}

impl MessageFilter {
    pub fn admits(self, message: &Message) -> bool {
        match self {
            Self::All => true,
            Self::Approved => message.is_approved,
            Self::Pending => !message.is_approved,
        }
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub event_id: Snowflake,
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub message_text: Option<String>,
    pub message_type: MessageType,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new Message. Messages always start unapproved.
    pub fn new(
        id: Snowflake,
        event_id: Snowflake,
        guest_name: String,
        message_type: MessageType,
    ) -> Self {
        Self {
            id,
            event_id,
            guest_name,
            guest_email: None,
            message_text: None,
            message_type,
            is_approved: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_email(mut self, guest_email: Option<String>) -> Self {
        self.guest_email = guest_email;
        self
    }

    pub fn with_text(mut self, message_text: Option<String>) -> Self {
        self.message_text = message_text;
        self
    }

    /// Check the submission rules that do not need the database
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.guest_name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "guest_name must not be blank".to_string(),
            ));
        }

        let has_text = self
            .message_text
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty());
        if self.message_type == MessageType::Text && !has_text {
            return Err(DomainError::ValidationError(
                "text messages need message_text".to_string(),
            ));
        }

        Ok(())
    }

    /// Mark approved. Returns false if it already was.
    pub fn approve(&mut self) -> bool {
        let changed = !self.is_approved;
        self.is_approved = true;
        changed
    }
}

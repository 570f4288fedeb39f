//! Event entity - a wedding (or similar) that guests leave messages for

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::entities::{Message, MessageType};
use crate::value_objects::{AccessCode, Snowflake};

/// Event entity
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: Snowflake,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub location: Option<String>,
    /// Subject of the identity provider that created the event
    pub host_id: String,
    /// Assigned once at creation, never changed afterwards
    pub access_code: AccessCode,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Create a new, active Event
    pub fn new(
        id: Snowflake,
        title: String,
        date: NaiveDate,
        host_id: String,
        access_code: AccessCode,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            description: None,
            date,
            location: None,
            host_id,
            access_code,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    /// Check if `host_id` owns this event
    #[inline]
    pub fn is_hosted_by(&self, host_id: &str) -> bool {
        self.host_id == host_id
    }

    /// Apply a partial update. Returns true if anything changed.
    pub fn apply(&mut self, changes: EventChanges) -> bool {
        let mut changed = false;

        if let Some(title) = changes.title {
            changed |= self.title != title;
            self.title = title;
        }
        if let Some(description) = changes.description {
            changed |= self.description != description;
            self.description = description;
        }
        if let Some(date) = changes.date {
            changed |= self.date != date;
            self.date = date;
        }
        if let Some(location) = changes.location {
            changed |= self.location != location;
            self.location = location;
        }
        if let Some(is_active) = changes.is_active {
            changed |= self.is_active != is_active;
            self.is_active = is_active;
        }

        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Soft delete. Returns false if the event was already inactive.
    pub fn deactivate(&mut self) -> bool {
        self.apply(EventChanges {
            is_active: Some(false),
            ..EventChanges::default()
        })
    }
}

/// Partial update of an event.
///
/// The outer `Option` means "leave unchanged"; for nullable columns the inner
/// `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub location: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl EventChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.is_active.is_none()
    }
}

/// Message counts per type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessagesByType {
    pub text: u64,
    pub audio: u64,
    pub video: u64,
    pub photo: u64,
    pub media: u64,
}

/// Moderation overview for one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventStats {
    pub total_messages: u64,
    pub approved_messages: u64,
    pub pending_messages: u64,
    pub messages_by_type: MessagesByType,
}

impl EventStats {
    pub fn tally(messages: &[Message]) -> Self {
        let mut stats = Self::default();
        for message in messages {
            stats.total_messages += 1;
            if message.is_approved {
                stats.approved_messages += 1;
            } else {
                stats.pending_messages += 1;
            }
            let slot = match message.message_type {
                MessageType::Text => &mut stats.messages_by_type.text,
                MessageType::Audio => &mut stats.messages_by_type.audio,
                MessageType::Video => &mut stats.messages_by_type.video,
                MessageType::Photo => &mut stats.messages_by_type.photo,
                MessageType::Media => &mut stats.messages_by_type.media,
            };
            *slot += 1;
        }
        stats
    }
}

//! GuestToken entity - a shareable credential scoped to one event

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::Event;
use crate::value_objects::Snowflake;

/// GuestToken entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestToken {
    pub id: Snowflake,
    pub event_id: Snowflake,
    pub token: String,
    pub guest_email: Option<String>,
    /// `None` means the token never expires
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl GuestToken {
    pub fn new(
        id: Snowflake,
        event_id: Snowflake,
        token: String,
        guest_email: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            event_id,
            token,
            guest_email,
            expires_at,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Expired once `expires_at` lies strictly before `now`
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }

    /// Active and not expired
    #[inline]
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now)
    }

    /// Check the token against its event, in the order
    /// not found, inactive, expired, event inactive.
    pub fn validate(
        token: Option<&Self>,
        event: Option<Event>,
        now: DateTime<Utc>,
    ) -> TokenValidation {
        let Some(token) = token else {
            return TokenValidation::invalid(InvalidReason::NotFound);
        };
        if !token.is_active {
            return TokenValidation::invalid(InvalidReason::Inactive);
        }
        if token.is_expired_at(now) {
            return TokenValidation::invalid(InvalidReason::Expired);
        }
        match event {
            Some(event) if event.is_active => TokenValidation::Valid {
                event,
                guest_email: token.guest_email.clone(),
            },
            _ => TokenValidation::invalid(InvalidReason::EventInactive),
        }
    }
}

/// Why a guest token was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    NotFound,
    Inactive,
    Expired,
    EventInactive,
}

/// Outcome of validating a guest token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValidation {
    Valid {
        event: Event,
        guest_email: Option<String>,
    },
    Invalid {
        reason: InvalidReason,
    },
}

impl TokenValidation {
    pub fn invalid(reason: InvalidReason) -> Self {
        Self::Invalid { reason }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use guestbook_core::entities::{Event, GuestToken, MediaFile, Message, TokenValidation};
use guestbook_core::PipelineState;

use super::responses::{
    EventResponse, GuestTokenResponse, MediaFileResponse, MessageResponse, MessageSummary,
    TokenValidationResponse,
};

// ============================================================================
// Event Mappers
// ============================================================================

impl From<&Event> for EventResponse {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.to_string(),
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date,
            location: event.location.clone(),
            host_id: event.host_id.clone(),
            access_code: event.access_code.to_string(),
            is_active: event.is_active,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self::from(&event)
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl MessageResponse {
    /// Build the response a viewer may see; guest emails go to the host only.
    pub fn for_viewer(message: Message, media_files: &[MediaFile], is_host: bool) -> Self {
        Self {
            id: message.id.to_string(),
            event_id: message.event_id.to_string(),
            guest_name: message.guest_name,
            guest_email: if is_host { message.guest_email } else { None },
            message_text: message.message_text,
            message_type: message.message_type,
            is_approved: message.is_approved,
            created_at: message.created_at,
            media_files: media_files.iter().map(MediaFileResponse::from).collect(),
        }
    }
}

impl From<&Message> for MessageSummary {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            guest_name: message.guest_name.clone(),
            message_type: message.message_type,
            is_approved: message.is_approved,
            created_at: message.created_at,
        }
    }
}

// ============================================================================
// Media Mappers
// ============================================================================

impl From<&MediaFile> for MediaFileResponse {
    fn from(media: &MediaFile) -> Self {
        let (failed_stage, failure_reason) = match &media.state {
            PipelineState::Failed {
                failed_stage,
                reason,
            } => (Some(failed_stage.as_str()), Some(reason.clone())),
            _ => (None, None),
        };

        Self {
            id: media.id.to_string(),
            message_id: media.message_id.to_string(),
            file_name: media.file_name.clone(),
            file_size: media.file_size,
            mime_type: media.mime_type.clone(),
            storage_url: media.storage_url.clone(),
            duration: media.duration,
            thumbnail_url: media.thumbnail_url.clone(),
            stage: media.state.stage_name(),
            failed_stage,
            failure_reason,
            created_at: media.created_at,
            updated_at: media.updated_at,
        }
    }
}

impl From<MediaFile> for MediaFileResponse {
    fn from(media: MediaFile) -> Self {
        Self::from(&media)
    }
}

// ============================================================================
// Guest Token Mappers
// ============================================================================

impl From<&GuestToken> for GuestTokenResponse {
    fn from(token: &GuestToken) -> Self {
        Self {
            id: token.id.to_string(),
            event_id: token.event_id.to_string(),
            token: token.token.clone(),
            guest_email: token.guest_email.clone(),
            expires_at: token.expires_at,
            is_active: token.is_active,
            created_at: token.created_at,
        }
    }
}

impl From<GuestToken> for GuestTokenResponse {
    fn from(token: GuestToken) -> Self {
        Self::from(&token)
    }
}

impl From<TokenValidation> for TokenValidationResponse {
    fn from(validation: TokenValidation) -> Self {
        match validation {
            TokenValidation::Valid { event, guest_email } => Self {
                valid: true,
                reason: None,
                event: Some(EventResponse::from(event)),
                guest_email,
            },
            TokenValidation::Invalid { reason } => Self {
                valid: false,
                reason: Some(reason),
                event: None,
                guest_email: None,
            },
        }
    }
}

//! Message entity <-> model mapper

use guestbook_core::entities::{Message, MessageType};
use guestbook_core::error::DomainError;
use guestbook_core::value_objects::Snowflake;

use crate::models::MessageModel;

/// Convert MessageModel to Message entity
impl TryFrom<MessageModel> for Message {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let message_type: MessageType = model.message_type.parse().map_err(|_| {
            DomainError::DatabaseError(format!(
                "message {} has unknown type {:?}",
                model.id, model.message_type
            ))
        })?;

        Ok(Message {
            id: Snowflake::new(model.id),
            event_id: Snowflake::new(model.event_id),
            guest_name: model.guest_name,
            guest_email: model.guest_email,
            message_text: model.message_text,
            message_type,
            is_approved: model.is_approved,
            created_at: model.created_at,
        })
    }
}

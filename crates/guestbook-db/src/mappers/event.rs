//! Event entity <-> model mapper

use guestbook_core::entities::Event;
use guestbook_core::error::DomainError;
use guestbook_core::value_objects::{AccessCode, Snowflake};

use crate::models::EventModel;

/// Convert EventModel to Event entity
impl TryFrom<EventModel> for Event {
    type Error = DomainError;

    fn try_from(model: EventModel) -> Result<Self, Self::Error> {
        let access_code = AccessCode::parse(&model.access_code).map_err(|_| {
            DomainError::DatabaseError(format!(
                "event {} has a malformed access code",
                model.id
            ))
        })?;

        Ok(Event {
            id: Snowflake::new(model.id),
            title: model.title,
            description: model.description,
            date: model.date,
            location: model.location,
            host_id: model.host_id,
            access_code,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

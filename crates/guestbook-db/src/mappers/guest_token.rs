//! GuestToken entity <-> model mapper

use guestbook_core::entities::GuestToken;
use guestbook_core::value_objects::Snowflake;

use crate::models::GuestTokenModel;

/// Convert GuestTokenModel to GuestToken entity
impl From<GuestTokenModel> for GuestToken {
    fn from(model: GuestTokenModel) -> Self {
        GuestToken {
            id: Snowflake::new(model.id),
            event_id: Snowflake::new(model.event_id),
            token: model.token,
            guest_email: model.guest_email,
            expires_at: model.expires_at,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

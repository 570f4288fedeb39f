//! Database models - SQLx-compatible structs for PostgreSQL tables

mod event;
mod guest_token;
mod media_file;
mod message;

pub use event::EventModel;
pub use guest_token::GuestTokenModel;
pub use media_file::MediaFileModel;
pub use message::MessageModel;

//! Domain entities

mod event;
mod guest_token;
mod media_file;
mod message;

pub use event::{Event, EventChanges, EventStats, MessagesByType};
pub use guest_token::{GuestToken, InvalidReason, TokenValidation};
pub use media_file::{FilesByType, MediaFile, MediaKind, MediaStats};
pub use message::{Message, MessageFilter, MessageType};

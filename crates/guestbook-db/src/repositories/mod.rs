//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in guestbook-core.

mod error;
mod event;
mod guest_token;
mod media_file;
mod message;

pub use event::PgEventRepository;
pub use guest_token::PgGuestTokenRepository;
pub use media_file::PgMediaFileRepository;
pub use message::PgMessageRepository;

//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] and implements one
//! group of use cases.

pub mod context;
pub mod error;
pub mod event;
pub mod guest_token;
pub mod maintenance;
pub mod media;
pub mod message;

#[cfg(test)]
mod mock_repositories;

pub use context::{ServiceContext, ServiceContextBuilder, ServiceSettings};
pub use error::{ServiceError, ServiceResult};
pub use event::EventService;
pub use guest_token::GuestTokenService;
pub use maintenance::MaintenanceService;
pub use media::MediaService;
pub use message::MessageService;

//! # guestbook-service
//!
//! Application layer: the guestbook use cases, the dependency container they
//! share, and the DTOs exchanged with the HTTP layer.

pub mod dto;
pub mod services;

pub use services::{
    EventService, GuestTokenService, MaintenanceService, MediaService, MessageService,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, ServiceSettings,
};

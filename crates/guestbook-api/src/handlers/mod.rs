//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod events;
pub mod guest_tokens;
pub mod health;
pub mod maintenance;
pub mod media;
pub mod messages;

//! Integration test utilities for the guestbook server
//!
//! Spawns the full router on an ephemeral port and drives it over HTTP.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

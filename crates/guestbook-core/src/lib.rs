//! # guestbook-core
//!
//! Domain layer containing entities, value objects, the code generator and
//! uniqueness guard, the media pipeline state machine, and repository traits.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Event, EventChanges, EventStats, FilesByType, GuestToken, InvalidReason, MediaFile, MediaKind,
    MediaStats, Message, MessageFilter, MessageType, MessagesByType, TokenValidation,
};
pub use error::DomainError;
pub use generation::{insert_unique, CodeKind, CodeSpec, ACCESS_CODE, GUEST_TOKEN, MAX_UNIQUE_ATTEMPTS};
pub use pipeline::{PipelineEvent, PipelineStage, PipelineState};
pub use traits::{
    BlobInfo, BlobStore, EventRepository, GuestTokenRepository, MediaFileRepository,
    MessageRepository, RepoResult, StoredBlob, UploadSlot,
};
pub use value_objects::{AccessCode, Snowflake, SnowflakeGenerator, SnowflakeParseError};

//! Axum extractors for request handling
//!
//! Custom extractors for host authentication, validation, path ids and
//! query strings.

mod auth;
mod path;
mod query;
mod validated;

pub use auth::{HostUser, OptionalHostUser};
pub use path::{
    parse_id, EventIdPath, MediaIdPath, MessageIdPath, StorageIdPath, TokenIdPath, UploadSlotPath,
};
pub use query::{MediaListParams, MessageListParams, QueryParams, TokenListParams};
pub use validated::{OptionalValidatedJson, ValidatedJson};

//! Ports implemented by the infrastructure crates

mod blob_store;
mod repositories;

pub use blob_store::{BlobInfo, BlobStore, StoredBlob, UploadSlot};
pub use repositories::{
    EventRepository, GuestTokenRepository, MediaFileRepository, MessageRepository, RepoResult,
};

//! Binary storage port
//!
//! Upload is two steps: the store hands out a write-once slot (an opaque token
//! behind an upload URL), the client sends the bytes to it and gets back a
//! storage id, which later resolves to a read URL.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::traits::RepoResult;
use crate::value_objects::Snowflake;

/// A write-once upload target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSlot {
    #[serde(skip)]
    pub token: String,
    pub upload_url: String,
    pub expires_at: DateTime<Utc>,
}

/// A blob that was just written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub storage_id: String,
    pub size: u64,
}

/// What the store knows about a blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobInfo {
    /// Media file the blob was uploaded for
    pub owner: Snowflake,
    pub size: u64,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Open an upload slot for `owner` that stays valid for `ttl`
    async fn issue_upload_slot(&self, owner: Snowflake, ttl: Duration) -> RepoResult<UploadSlot>;

    /// Consume a slot. Returns its owner, or `None` if it is unknown,
    /// already used or expired.
    async fn claim_slot(&self, token: &str) -> RepoResult<Option<Snowflake>>;

    /// Persist bytes for `owner`
    async fn write(&self, owner: Snowflake, bytes: &[u8]) -> RepoResult<StoredBlob>;

    /// Look a blob up without reading it
    async fn stat(&self, storage_id: &str) -> RepoResult<Option<BlobInfo>>;

    /// Read URL for a stored blob
    fn resolve_url(&self, storage_id: &str) -> String;

    /// Read a blob's bytes
    async fn read(&self, storage_id: &str) -> RepoResult<Option<Vec<u8>>>;

    /// Remove a blob. Returns false if it did not exist.
    async fn delete(&self, storage_id: &str) -> RepoResult<bool>;

    /// Remove every blob written for `owner`
    async fn delete_by_owner(&self, owner: Snowflake) -> RepoResult<usize>;

    /// Forget expired, unused slots. Returns how many were dropped.
    async fn purge_expired_slots(&self) -> usize;
}

//! Local-disk blob store
//!
//! Each blob is one flat file at `{dir}/{storage_id}` where the storage id is
//! `{owner}-{uuid}`. Upload slots live in memory only; a restart invalidates
//! outstanding upload URLs, and clients simply request a new one.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use guestbook_core::error::DomainError;
use guestbook_core::generation::GUEST_TOKEN;
use guestbook_core::traits::{BlobInfo, BlobStore, RepoResult, StoredBlob, UploadSlot};
use guestbook_core::value_objects::Snowflake;

#[derive(Debug, Clone, Copy)]
struct PendingSlot {
    owner: Snowflake,
    expires_at: DateTime<Utc>,
}

/// Blob store backed by a directory
#[derive(Debug)]
pub struct LocalBlobStore {
    dir: PathBuf,
    public_base_url: String,
    slots: DashMap<String, PendingSlot>,
}

fn io_error(context: &str, e: &std::io::Error) -> DomainError {
    DomainError::StorageError(format!("{context}: {e}"))
}

/// Split a storage id into its owner, rejecting anything that is not
/// exactly `{i64}-{32 hex}` so ids can never address paths outside `dir`.
fn parse_storage_id(storage_id: &str) -> Option<Snowflake> {
    let (owner, suffix) = storage_id.split_once('-')?;
    if suffix.len() != 32 || !suffix.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    if owner.is_empty() || !owner.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    owner.parse::<i64>().ok().map(Snowflake::new)
}

impl LocalBlobStore {
    /// Open (and create if needed) the storage directory
    pub async fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> RepoResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error("create storage directory", &e))?;
        info!(dir = %dir.display(), "Blob storage ready");

        Ok(Self {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            slots: DashMap::new(),
        })
    }

    fn blob_path(&self, storage_id: &str) -> RepoResult<PathBuf> {
        parse_storage_id(storage_id)
            .map(|_| self.dir.join(storage_id))
            .ok_or_else(|| DomainError::InvalidStorageId(storage_id.to_string()))
    }

    /// Outstanding (unclaimed) slots, including expired ones not yet purged
    pub fn pending_slots(&self) -> usize {
        self.slots.len()
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    #[instrument(skip(self))]
    async fn issue_upload_slot(&self, owner: Snowflake, ttl: Duration) -> RepoResult<UploadSlot> {
        let token = GUEST_TOKEN.generate();
        let expires_at = Utc::now() + ttl;
        self.slots
            .insert(token.clone(), PendingSlot { owner, expires_at });

        Ok(UploadSlot {
            upload_url: format!("{}/api/v1/uploads/{token}", self.public_base_url),
            token,
            expires_at,
        })
    }

    #[instrument(skip_all)]
    async fn claim_slot(&self, token: &str) -> RepoResult<Option<Snowflake>> {
        // Removing is the claim: a second upload to the same URL finds nothing.
        let Some((_, slot)) = self.slots.remove(token) else {
            return Ok(None);
        };
        if slot.expires_at < Utc::now() {
            debug!(owner = %slot.owner, "Upload slot expired before use");
            return Ok(None);
        }
        Ok(Some(slot.owner))
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn write(&self, owner: Snowflake, bytes: &[u8]) -> RepoResult<StoredBlob> {
        let storage_id = format!("{owner}-{}", Uuid::new_v4().simple());
        let path = self.dir.join(&storage_id);
        let partial = self.dir.join(format!("{storage_id}.part"));

        // Readers never observe a half-written blob
        fs::write(&partial, bytes)
            .await
            .map_err(|e| io_error("write blob", &e))?;
        if let Err(e) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(io_error("commit blob", &e));
        }

        debug!(storage_id = %storage_id, "Blob stored");
        Ok(StoredBlob {
            storage_id,
            size: bytes.len() as u64,
        })
    }

    async fn stat(&self, storage_id: &str) -> RepoResult<Option<BlobInfo>> {
        let Some(owner) = parse_storage_id(storage_id) else {
            return Ok(None);
        };
        match fs::metadata(self.dir.join(storage_id)).await {
            Ok(meta) => Ok(Some(BlobInfo {
                owner,
                size: meta.len(),
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("stat blob", &e)),
        }
    }

    fn resolve_url(&self, storage_id: &str) -> String {
        format!("{}/api/v1/files/{storage_id}", self.public_base_url)
    }

    async fn read(&self, storage_id: &str) -> RepoResult<Option<Vec<u8>>> {
        let path = self.blob_path(storage_id)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read blob", &e)),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, storage_id: &str) -> RepoResult<bool> {
        let path = self.blob_path(storage_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(storage_id = %storage_id, "Blob deleted");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(storage_id = %storage_id, "Blob already gone");
                Ok(false)
            }
            Err(e) => Err(io_error("delete blob", &e)),
        }
    }

    #[instrument(skip(self))]
    async fn delete_by_owner(&self, owner: Snowflake) -> RepoResult<usize> {
        let prefix = format!("{owner}-");
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| io_error("list blobs", &e))?;

        let mut deleted = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error("list blobs", &e))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !name.starts_with(&prefix) {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => deleted += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(io_error("delete blob", &e)),
            }
        }

        Ok(deleted)
    }

    async fn purge_expired_slots(&self) -> usize {
        let now = Utc::now();
        let before = self.slots.len();
        self.slots.retain(|_, slot| slot.expires_at >= now);
        before.saturating_sub(self.slots.len())
    }
}

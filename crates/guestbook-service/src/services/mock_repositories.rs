//! In-memory repository and blob-store fakes for service tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use guestbook_core::entities::{
    Event, GuestToken, MediaFile, Message, MessageFilter, MessageType,
};
use guestbook_core::traits::{
    BlobInfo, BlobStore, EventRepository, GuestTokenRepository, MediaFileRepository,
    MessageRepository, RepoResult, StoredBlob, UploadSlot,
};
use guestbook_core::{
    AccessCode, CodeKind, DomainError, PipelineState, Snowflake, SnowflakeGenerator, GUEST_TOKEN,
};

use super::context::{ServiceContext, ServiceSettings};

#[derive(Default)]
struct Tables {
    events: HashMap<Snowflake, Event>,
    messages: HashMap<Snowflake, Message>,
    media: HashMap<Snowflake, MediaFile>,
    tokens: HashMap<Snowflake, GuestToken>,
}

/// All four tables behind one lock, so multi-table operations are atomic
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    collide: AtomicBool,
    lose_race: AtomicBool,
}

impl MemoryStore {
    /// Make every access code and token insert hit the unique index
    pub fn collide_always(&self) {
        self.collide.store(true, Ordering::SeqCst);
    }

    pub fn message_count(&self) -> usize {
        self.tables.lock().messages.len()
    }

    pub fn media_count(&self) -> usize {
        self.tables.lock().media.len()
    }

    pub fn token_count(&self) -> usize {
        self.tables.lock().tokens.len()
    }

    /// Force a token's expiry, bypassing service checks
    pub fn set_token_expiry(&self, id: Snowflake, expires_at: Option<DateTime<Utc>>) {
        if let Some(token) = self.tables.lock().tokens.get_mut(&id) {
            token.expires_at = expires_at;
        }
    }

    /// Backdate a media row's last update
    pub fn age_media(&self, id: Snowflake, by: Duration) {
        if let Some(media) = self.tables.lock().media.get_mut(&id) {
            media.updated_at -= by;
        }
    }

    /// Make the next pipeline stage update behave as if another request
    /// moved the row first
    pub fn lose_next_stage_update(&self) {
        self.lose_race.store(true, Ordering::SeqCst);
    }

    fn collides(&self) -> bool {
        self.collide.load(Ordering::SeqCst)
    }
}

fn newest_first<T>(mut rows: Vec<T>, key: impl Fn(&T) -> (DateTime<Utc>, Snowflake)) -> Vec<T> {
    rows.sort_by_key(|row| std::cmp::Reverse(key(row)));
    rows
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Event>> {
        Ok(self.tables.lock().events.get(&id).cloned())
    }

    async fn find_by_access_code(&self, code: &AccessCode) -> RepoResult<Option<Event>> {
        Ok(self
            .tables
            .lock()
            .events
            .values()
            .find(|e| &e.access_code == code)
            .cloned())
    }

    async fn find_by_host(&self, host_id: &str) -> RepoResult<Vec<Event>> {
        let rows = self
            .tables
            .lock()
            .events
            .values()
            .filter(|e| e.host_id == host_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |e| (e.created_at, e.id)))
    }

    async fn find_active(&self) -> RepoResult<Vec<Event>> {
        let rows = self
            .tables
            .lock()
            .events
            .values()
            .filter(|e| e.is_active)
            .cloned()
            .collect();
        Ok(newest_first(rows, |e| (e.created_at, e.id)))
    }

    async fn create(&self, event: &Event) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        let taken = tables
            .events
            .values()
            .any(|e| e.access_code == event.access_code);
        if taken || self.collides() {
            return Err(DomainError::DuplicateCode(CodeKind::AccessCode));
        }
        tables.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn update(&self, event: &Event) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        let Some(stored) = tables.events.get_mut(&event.id) else {
            return Err(DomainError::EventNotFound(event.id));
        };
        let access_code = stored.access_code.clone();
        *stored = event.clone();
        stored.access_code = access_code;
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self.tables.lock().messages.get(&id).cloned())
    }

    async fn find_by_event(
        &self,
        event_id: Snowflake,
        filter: MessageFilter,
    ) -> RepoResult<Vec<Message>> {
        let rows = self
            .tables
            .lock()
            .messages
            .values()
            .filter(|m| m.event_id == event_id && filter.admits(m))
            .cloned()
            .collect();
        Ok(newest_first(rows, |m| (m.created_at, m.id)))
    }

    async fn create_for_active_event(&self, message: &Message) -> RepoResult<bool> {
        let mut tables = self.tables.lock();
        let active = tables
            .events
            .get(&message.event_id)
            .is_some_and(|e| e.is_active);
        if active {
            tables.messages.insert(message.id, message.clone());
        }
        Ok(active)
    }

    async fn approve(&self, id: Snowflake) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        let message = tables
            .messages
            .get_mut(&id)
            .ok_or(DomainError::MessageNotFound(id))?;
        message.is_approved = true;
        Ok(())
    }

    async fn delete_with_media(&self, id: Snowflake) -> RepoResult<u64> {
        let mut tables = self.tables.lock();
        if !tables.messages.contains_key(&id) {
            return Err(DomainError::MessageNotFound(id));
        }
        let before = tables.media.len();
        tables.media.retain(|_, m| m.message_id != id);
        let deleted = before - tables.media.len();
        tables.messages.remove(&id);
        Ok(deleted as u64)
    }
}

#[async_trait]
impl MediaFileRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<MediaFile>> {
        Ok(self.tables.lock().media.get(&id).cloned())
    }

    async fn find_by_message(&self, message_id: Snowflake) -> RepoResult<Vec<MediaFile>> {
        let mut rows: Vec<MediaFile> = self
            .tables
            .lock()
            .media
            .values()
            .filter(|m| m.message_id == message_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| (m.created_at, m.id));
        Ok(rows)
    }

    async fn find_by_messages(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<MediaFile>> {
        Ok(self
            .tables
            .lock()
            .media
            .values()
            .filter(|m| message_ids.contains(&m.message_id))
            .cloned()
            .collect())
    }

    async fn create(&self, media: &MediaFile) -> RepoResult<()> {
        self.tables.lock().media.insert(media.id, media.clone());
        Ok(())
    }

    async fn update_state(
        &self,
        id: Snowflake,
        expected: &PipelineState,
        next: &PipelineState,
    ) -> RepoResult<bool> {
        let mut tables = self.tables.lock();
        let media = tables
            .media
            .get_mut(&id)
            .ok_or(DomainError::MediaFileNotFound(id))?;
        if self.lose_race.swap(false, Ordering::SeqCst)
            || media.state.stage_name() != expected.stage_name()
        {
            return Ok(false);
        }
        media.state = next.clone();
        media.updated_at = Utc::now();
        Ok(true)
    }

    async fn finalize(
        &self,
        id: Snowflake,
        storage_ref: &str,
        storage_url: &str,
    ) -> RepoResult<bool> {
        let mut tables = self.tables.lock();
        let media = tables
            .media
            .get_mut(&id)
            .ok_or(DomainError::MediaFileNotFound(id))?;
        if media.state != PipelineState::Uploaded {
            return Ok(false);
        }
        media.storage_ref = Some(storage_ref.to_string());
        media.storage_url = Some(storage_url.to_string());
        media.state = PipelineState::Finalized;
        media.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.tables
            .lock()
            .media
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::MediaFileNotFound(id))
    }

    async fn find_incomplete_before(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<MediaFile>> {
        Ok(self
            .tables
            .lock()
            .media
            .values()
            .filter(|m| !m.state.is_finalized() && m.updated_at < cutoff)
            .cloned()
            .collect())
    }

    async fn delete_pending(&self, ids: &[Snowflake], cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let mut tables = self.tables.lock();
        let before = tables.media.len();
        tables.media.retain(|id, m| {
            !ids.contains(id) || m.state.is_finalized() || m.updated_at >= cutoff
        });
        Ok((before - tables.media.len()) as u64)
    }
}

#[async_trait]
impl GuestTokenRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<GuestToken>> {
        Ok(self.tables.lock().tokens.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> RepoResult<Option<GuestToken>> {
        Ok(self
            .tables
            .lock()
            .tokens
            .values()
            .find(|t| t.token == token)
            .cloned())
    }

    async fn find_by_event(&self, event_id: Snowflake) -> RepoResult<Vec<GuestToken>> {
        let rows = self
            .tables
            .lock()
            .tokens
            .values()
            .filter(|t| t.event_id == event_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |t| (t.created_at, t.id)))
    }

    async fn create(&self, token: &GuestToken) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        let taken = tables.tokens.values().any(|t| t.token == token.token);
        if taken || self.collides() {
            return Err(DomainError::DuplicateCode(CodeKind::GuestToken));
        }
        tables.tokens.insert(token.id, token.clone());
        Ok(())
    }

    async fn set_active(&self, id: Snowflake, is_active: bool) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        let token = tables
            .tokens
            .get_mut(&id)
            .ok_or(DomainError::GuestTokenNotFound(id))?;
        token.is_active = is_active;
        Ok(())
    }

    async fn update_expiration(
        &self,
        id: Snowflake,
        expires_at: Option<DateTime<Utc>>,
    ) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        let token = tables
            .tokens
            .get_mut(&id)
            .ok_or(DomainError::GuestTokenNotFound(id))?;
        token.expires_at = expires_at;
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.tables
            .lock()
            .tokens
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::GuestTokenNotFound(id))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut tables = self.tables.lock();
        let before = tables.tokens.len();
        tables.tokens.retain(|_, t| !t.is_expired_at(now));
        Ok((before - tables.tokens.len()) as u64)
    }
}

/// Blob store keeping everything in maps
#[derive(Default)]
pub struct MemoryBlobs {
    slots: Mutex<HashMap<String, (Snowflake, DateTime<Utc>)>>,
    blobs: Mutex<HashMap<String, (Snowflake, Vec<u8>)>>,
    next: AtomicU64,
    fail_writes: AtomicBool,
}

impl MemoryBlobs {
    /// Make every subsequent write fail like a full disk
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.lock().len()
    }

    /// Store a blob without going through an upload slot
    pub fn put(&self, owner: Snowflake, bytes: &[u8]) -> String {
        let storage_id = format!("{owner}-{:032x}", self.next.fetch_add(1, Ordering::SeqCst));
        self.blobs
            .lock()
            .insert(storage_id.clone(), (owner, bytes.to_vec()));
        storage_id
    }
}

#[async_trait]
impl BlobStore for MemoryBlobs {
    async fn issue_upload_slot(&self, owner: Snowflake, ttl: Duration) -> RepoResult<UploadSlot> {
        let token = GUEST_TOKEN.generate();
        let expires_at = Utc::now() + ttl;
        self.slots.lock().insert(token.clone(), (owner, expires_at));
        Ok(UploadSlot {
            upload_url: format!("http://guestbook.test/api/v1/uploads/{token}"),
            token,
            expires_at,
        })
    }

    async fn claim_slot(&self, token: &str) -> RepoResult<Option<Snowflake>> {
        Ok(self
            .slots
            .lock()
            .remove(token)
            .filter(|(_, expires_at)| *expires_at >= Utc::now())
            .map(|(owner, _)| owner))
    }

    async fn write(&self, owner: Snowflake, bytes: &[u8]) -> RepoResult<StoredBlob> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::StorageError("disk full".to_string()));
        }
        Ok(StoredBlob {
            storage_id: self.put(owner, bytes),
            size: bytes.len() as u64,
        })
    }

    async fn stat(&self, storage_id: &str) -> RepoResult<Option<BlobInfo>> {
        Ok(self
            .blobs
            .lock()
            .get(storage_id)
            .map(|(owner, bytes)| BlobInfo {
                owner: *owner,
                size: bytes.len() as u64,
            }))
    }

    fn resolve_url(&self, storage_id: &str) -> String {
        format!("http://guestbook.test/api/v1/files/{storage_id}")
    }

    async fn read(&self, storage_id: &str) -> RepoResult<Option<Vec<u8>>> {
        Ok(self
            .blobs
            .lock()
            .get(storage_id)
            .map(|(_, bytes)| bytes.clone()))
    }

    async fn delete(&self, storage_id: &str) -> RepoResult<bool> {
        Ok(self.blobs.lock().remove(storage_id).is_some())
    }

    async fn delete_by_owner(&self, owner: Snowflake) -> RepoResult<usize> {
        let mut blobs = self.blobs.lock();
        let before = blobs.len();
        blobs.retain(|_, (o, _)| *o != owner);
        Ok(before - blobs.len())
    }

    async fn purge_expired_slots(&self) -> usize {
        let now = Utc::now();
        let mut slots = self.slots.lock();
        let before = slots.len();
        slots.retain(|_, (_, expires_at)| *expires_at >= now);
        before - slots.len()
    }
}

/// Service context wired to the in-memory fakes
pub struct TestHarness {
    pub ctx: ServiceContext,
    pub store: Arc<MemoryStore>,
    pub blobs: Arc<MemoryBlobs>,
}

impl TestHarness {
    /// Largest upload the harness accepts
    pub const MAX_FILE_SIZE: u64 = 1024;

    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let blobs = Arc::new(MemoryBlobs::default());
        let ctx = ServiceContext::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            blobs.clone(),
            Arc::new(SnowflakeGenerator::new(1)),
            ServiceSettings {
                max_file_size_bytes: Self::MAX_FILE_SIZE,
                upload_url_ttl: Duration::minutes(15),
                public_base_url: "http://guestbook.test".to_string(),
            },
        );
        Self { ctx, store, blobs }
    }

    /// Insert an active event owned by `host_id`
    pub async fn event(&self, host_id: &str) -> Event {
        let event = Event::new(
            self.ctx.generate_id(),
            "Ana & Ben".to_string(),
            chrono::NaiveDate::from_ymd_opt(2026, 6, 20).unwrap(),
            host_id.to_string(),
            AccessCode::generate(),
        );
        EventRepository::create(self.store.as_ref(), &event)
            .await
            .unwrap();
        event
    }

    /// Insert a text message
    pub async fn message(&self, event_id: Snowflake, approved: bool) -> Message {
        let mut message = Message::new(
            self.ctx.generate_id(),
            event_id,
            "Guest".to_string(),
            MessageType::Text,
        )
        .with_text(Some("Congratulations!".to_string()));
        message.is_approved = approved;
        self.store.tables.lock().messages.insert(message.id, message.clone());
        message
    }

    /// Insert a media row in `state`, with a stored blob when finalized
    pub async fn media(&self, message_id: Snowflake, state: PipelineState) -> MediaFile {
        let mut media = MediaFile::new(
            self.ctx.generate_id(),
            message_id,
            "photo.jpg".to_string(),
            4,
            "image/jpeg".to_string(),
        );
        if state.is_finalized() {
            let storage_id = self.blobs.put(media.id, b"jpeg");
            media.storage_url = Some(self.blobs.resolve_url(&storage_id));
            media.storage_ref = Some(storage_id);
        }
        media.state = state;
        self.store.tables.lock().media.insert(media.id, media.clone());
        media
    }
}

//! Repository traits (ports) - the data access the domain needs
//!
//! Implementations map unique-index violations on `access_code` and `token`
//! to `DomainError::DuplicateCode` so that `insert_unique` can retry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Event, GuestToken, MediaFile, Message, MessageFilter};
use crate::error::DomainError;
use crate::pipeline::PipelineState;
use crate::value_objects::{AccessCode, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Event Repository
// ============================================================================

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Find event by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Event>>;

    /// Find event by its (already normalized) access code
    async fn find_by_access_code(&self, code: &AccessCode) -> RepoResult<Option<Event>>;

    /// Events owned by a host, newest first
    async fn find_by_host(&self, host_id: &str) -> RepoResult<Vec<Event>>;

    /// All active events, newest first
    async fn find_active(&self) -> RepoResult<Vec<Event>>;

    /// Insert a new event. Fails with `DuplicateCode` if the access code is taken.
    async fn create(&self, event: &Event) -> RepoResult<()>;

    /// Persist mutable fields. The access code is never written.
    async fn update(&self, event: &Event) -> RepoResult<()>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Messages of an event matching `filter`, newest first
    async fn find_by_event(
        &self,
        event_id: Snowflake,
        filter: MessageFilter,
    ) -> RepoResult<Vec<Message>>;

    /// Insert only if the owning event exists and is active.
    ///
    /// Returns false when nothing was inserted.
    async fn create_for_active_event(&self, message: &Message) -> RepoResult<bool>;

    /// Set `is_approved`. Approving twice is a no-op.
    async fn approve(&self, id: Snowflake) -> RepoResult<()>;

    /// Delete the message's media rows, then the message, atomically.
    ///
    /// Returns the number of media rows removed.
    async fn delete_with_media(&self, id: Snowflake) -> RepoResult<u64>;
}

// ============================================================================
// Media File Repository
// ============================================================================

#[async_trait]
pub trait MediaFileRepository: Send + Sync {
    /// Find media file by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<MediaFile>>;

    /// Media files attached to a message, oldest first
    async fn find_by_message(&self, message_id: Snowflake) -> RepoResult<Vec<MediaFile>>;

    /// Media files attached to any of `message_ids`
    async fn find_by_messages(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<MediaFile>>;

    /// Insert the metadata row
    async fn create(&self, media: &MediaFile) -> RepoResult<()>;

    /// Move the row from `expected` to `next` if nobody moved it first.
    ///
    /// Returns false when the stored stage no longer matches `expected`.
    async fn update_state(
        &self,
        id: Snowflake,
        expected: &PipelineState,
        next: &PipelineState,
    ) -> RepoResult<bool>;

    /// Attach the storage location and mark the row finalized.
    ///
    /// Only applies to rows in the `uploaded` stage; returns false otherwise.
    async fn finalize(
        &self,
        id: Snowflake,
        storage_ref: &str,
        storage_url: &str,
    ) -> RepoResult<bool>;

    /// Delete a media row
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Non-finalized rows last touched before `cutoff`
    async fn find_incomplete_before(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<MediaFile>>;

    /// Delete those of `ids` that are still not finalized and were last
    /// touched before `cutoff`
    async fn delete_pending(&self, ids: &[Snowflake], cutoff: DateTime<Utc>) -> RepoResult<u64>;
}

// ============================================================================
// Guest Token Repository
// ============================================================================

#[async_trait]
pub trait GuestTokenRepository: Send + Sync {
    /// Find token by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<GuestToken>>;

    /// Find token by its secret value
    async fn find_by_token(&self, token: &str) -> RepoResult<Option<GuestToken>>;

    /// Tokens of an event, newest first
    async fn find_by_event(&self, event_id: Snowflake) -> RepoResult<Vec<GuestToken>>;

    /// Insert a new token. Fails with `DuplicateCode` if the value is taken.
    async fn create(&self, token: &GuestToken) -> RepoResult<()>;

    /// Set the active flag
    async fn set_active(&self, id: Snowflake, is_active: bool) -> RepoResult<()>;

    /// Replace (or clear) the expiry
    async fn update_expiration(
        &self,
        id: Snowflake,
        expires_at: Option<DateTime<Utc>>,
    ) -> RepoResult<()>;

    /// Hard delete
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Delete every token whose expiry lies before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64>;
}

//! Media service
//!
//! Server side of the media submission pipeline:
//! metadata → upload URL → upload → finalize, with `failed` reachable from
//! every step. Each step moves the persisted stage with a compare-and-set so
//! two clients racing on the same row cannot both win.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use guestbook_core::entities::{MediaFile, MediaStats, Message, MessageFilter};
use guestbook_core::{DomainError, PipelineEvent, PipelineState, Snowflake};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::dto::{
    FinalizeMediaRequest, MediaFileResponse, MediaWithMessageResponse, MessageSummary,
    ReportFailureRequest, StoredFile, SubmitMediaRequest, SweepOutcome, UploadResponse,
    UploadUrlResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::event::EventService;
use super::message::{finished, MessageService};

/// Remove the stored files of a media row, logging instead of failing.
///
/// A finalized row names its file. Otherwise the store is searched by owner,
/// unless no upload URL was ever handed out for the row.
pub(crate) async fn discard_blobs(ctx: &ServiceContext, media: &MediaFile) -> u64 {
    let result = match (&media.storage_ref, &media.state) {
        (Some(storage_id), _) => ctx.blob_store().delete(storage_id).await.map(u64::from),
        (None, PipelineState::MetadataSubmitted) => Ok(0),
        (None, _) => ctx
            .blob_store()
            .delete_by_owner(media.id)
            .await
            .map(|count| count as u64),
    };

    result.unwrap_or_else(|e| {
        warn!(media_id = %media.id, error = %e, "Failed to remove stored files");
        0
    })
}

/// Media service
pub struct MediaService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MediaService<'a> {
    /// Create a new MediaService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record file metadata for a message. Opens the pipeline on the server.
    #[instrument(skip(self, request), fields(file_size = request.file_size))]
    pub async fn submit_metadata(
        &self,
        message_id: Snowflake,
        request: SubmitMediaRequest,
    ) -> ServiceResult<MediaFileResponse> {
        request.validate()?;

        let max_bytes = self.ctx.settings().max_file_size_bytes;
        match u64::try_from(request.file_size) {
            Ok(0) | Err(_) => {
                return Err(ServiceError::validation("file_size must be positive"));
            }
            Ok(size) if size > max_bytes => {
                return Err(DomainError::FileTooLarge { max_bytes }.into());
            }
            Ok(_) => {}
        }

        let message = MessageService::new(self.ctx).find(message_id).await?;
        if !message.message_type.carries_media() {
            return Err(ServiceError::validation(
                "text messages cannot carry media files",
            ));
        }

        let mut media = MediaFile::new(
            self.ctx.generate_id(),
            message_id,
            request.file_name,
            request.file_size,
            request.mime_type,
        );
        media.duration = request.duration;
        media.thumbnail_url = request.thumbnail_url;

        self.ctx.media_repo().create(&media).await?;

        info!(media_id = %media.id, message_id = %message_id, "Media metadata submitted");

        Ok(MediaFileResponse::from(media))
    }

    /// Issue a write-once upload URL for the row.
    ///
    /// Asking again replaces an expired URL; the previous one stays usable
    /// until it expires or is used.
    #[instrument(skip(self))]
    pub async fn request_upload_url(&self, media_id: Snowflake) -> ServiceResult<UploadUrlResponse> {
        let media = self.find(media_id).await?;
        let next = media.state.transition(PipelineEvent::IssueUploadUrl)?;
        self.advance(&media, &next).await?;

        let slot = self
            .ctx
            .blob_store()
            .issue_upload_slot(media_id, self.ctx.settings().upload_url_ttl)
            .await?;

        debug!(media_id = %media_id, expires_at = %slot.expires_at, "Upload URL issued");

        Ok(UploadUrlResponse {
            media_id: media_id.to_string(),
            upload_url: slot.upload_url,
            expires_at: slot.expires_at,
        })
    }

    /// Accept the binary sent to an upload URL.
    ///
    /// The slot is consumed whatever happens next. A storage failure marks
    /// the row failed and leaves it without a storage reference.
    #[instrument(skip(self, slot, bytes), fields(size = bytes.len()))]
    pub async fn upload(&self, slot: &str, bytes: &[u8]) -> ServiceResult<UploadResponse> {
        let media_id = self
            .ctx
            .blob_store()
            .claim_slot(slot)
            .await?
            .ok_or(DomainError::UploadSlotNotFound)?;
        let media = self.find(media_id).await?;

        if bytes.is_empty() {
            return Err(ServiceError::validation("upload body is empty"));
        }
        let max_bytes = self.ctx.settings().max_file_size_bytes;
        if bytes.len() as u64 > max_bytes {
            return Err(DomainError::FileTooLarge { max_bytes }.into());
        }

        let uploaded = media.state.transition(PipelineEvent::CompleteUpload)?;

        let blob = match self.ctx.blob_store().write(media_id, bytes).await {
            Ok(blob) => blob,
            Err(e) => {
                warn!(media_id = %media_id, error = %e, "Upload failed");
                self.mark_failed(&media, e.to_string()).await;
                return Err(e.into());
            }
        };

        // Another upload for this row got there first; drop only our own file
        if let Err(e) = self.advance(&media, &uploaded).await {
            if let Err(delete_err) = self.ctx.blob_store().delete(&blob.storage_id).await {
                warn!(
                    media_id = %media_id,
                    storage_id = %blob.storage_id,
                    error = %delete_err,
                    "Failed to remove superseded upload"
                );
            }
            return Err(e);
        }

        info!(media_id = %media_id, storage_id = %blob.storage_id, "Media uploaded");

        Ok(UploadResponse {
            media_id: media_id.to_string(),
            storage_id: blob.storage_id,
            size: blob.size,
        })
    }

    /// Attach the stored file to the row. The only step that completes it.
    #[instrument(skip(self, request))]
    pub async fn finalize(
        &self,
        media_id: Snowflake,
        request: FinalizeMediaRequest,
    ) -> ServiceResult<MediaFileResponse> {
        let storage_id = request.storage_id.trim();
        if storage_id.is_empty() {
            return Err(ServiceError::validation("storage_id is required"));
        }

        let mut media = self.find(media_id).await?;

        let owned = self
            .ctx
            .blob_store()
            .stat(storage_id)
            .await?
            .is_some_and(|blob| blob.owner == media_id);
        if !owned {
            return Err(ServiceError::validation(
                "storage_id does not name a file uploaded for this media",
            ));
        }

        let finalized = media.state.transition(PipelineEvent::Finalize)?;
        let storage_url = self.ctx.blob_store().resolve_url(storage_id);

        if !self
            .ctx
            .media_repo()
            .finalize(media_id, storage_id, &storage_url)
            .await?
        {
            return Err(DomainError::StageConflict(media_id).into());
        }

        media.storage_ref = Some(storage_id.to_string());
        media.storage_url = Some(storage_url);
        media.state = finalized;
        media.updated_at = Utc::now();

        info!(media_id = %media_id, "Media finalized");

        Ok(MediaFileResponse::from(media))
    }

    /// Record a failure the client ran into
    #[instrument(skip(self, request))]
    pub async fn report_failure(
        &self,
        media_id: Snowflake,
        request: ReportFailureRequest,
    ) -> ServiceResult<MediaFileResponse> {
        request.validate()?;

        let mut media = self.find(media_id).await?;
        let mut failed = media.state.transition(PipelineEvent::Fail {
            reason: request.reason,
        })?;
        if let (Some(stage), PipelineState::Failed { failed_stage, .. }) =
            (request.stage, &mut failed)
        {
            *failed_stage = stage;
        }

        self.advance(&media, &failed).await?;
        info!(media_id = %media_id, state = ?failed, "Media pipeline failure reported");

        media.state = failed;
        media.updated_at = Utc::now();
        Ok(MediaFileResponse::from(media))
    }

    /// Get media file by ID. Non-hosts only see finished files of approved messages.
    #[instrument(skip(self))]
    pub async fn get_media_file(
        &self,
        media_id: Snowflake,
        caller: Option<&str>,
    ) -> ServiceResult<MediaFileResponse> {
        let not_found = || ServiceError::from(DomainError::MediaFileNotFound(media_id));

        let media = self.find(media_id).await?;
        let is_host = self
            .visible_to(media.message_id, caller)
            .await?
            .ok_or_else(not_found)?;
        if !is_host && !media.is_complete() {
            return Err(not_found());
        }

        Ok(MediaFileResponse::from(media))
    }

    /// Media of one message. Non-hosts only see finished files of approved messages.
    #[instrument(skip(self))]
    pub async fn list_media_by_message(
        &self,
        message_id: Snowflake,
        caller: Option<&str>,
    ) -> ServiceResult<Vec<MediaFileResponse>> {
        let (_, is_host) = MessageService::new(self.ctx)
            .find_visible(message_id, caller)
            .await?;

        let mut media = self.ctx.media_repo().find_by_message(message_id).await?;
        if !is_host {
            media = finished(media);
        }

        Ok(media.into_iter().map(MediaFileResponse::from).collect())
    }

    /// Finished media of an event with the message each belongs to
    #[instrument(skip(self))]
    pub async fn list_media_by_event(
        &self,
        host_id: &str,
        event_id: Snowflake,
        approved_only: bool,
    ) -> ServiceResult<Vec<MediaWithMessageResponse>> {
        EventService::new(self.ctx)
            .require_owned(host_id, event_id)
            .await?;

        let filter = if approved_only {
            MessageFilter::Approved
        } else {
            MessageFilter::All
        };
        let (messages, media) = self.event_media(event_id, filter).await?;
        let by_id: HashMap<Snowflake, &Message> = messages.iter().map(|m| (m.id, m)).collect();

        Ok(media
            .iter()
            .filter_map(|file| {
                by_id.get(&file.message_id).map(|message| MediaWithMessageResponse {
                    media: MediaFileResponse::from(file),
                    message: MessageSummary::from(*message),
                })
            })
            .collect())
    }

    /// Size and type breakdown of an event's finished media
    #[instrument(skip(self))]
    pub async fn media_stats(&self, host_id: &str, event_id: Snowflake) -> ServiceResult<MediaStats> {
        EventService::new(self.ctx)
            .require_owned(host_id, event_id)
            .await?;

        let (_, media) = self.event_media(event_id, MessageFilter::All).await?;
        Ok(MediaStats::tally(&media))
    }

    /// Delete a media row and its stored file
    #[instrument(skip(self))]
    pub async fn delete_media_file(&self, host_id: &str, media_id: Snowflake) -> ServiceResult<()> {
        let media = self.find(media_id).await?;
        let message = MessageService::new(self.ctx).find(media.message_id).await?;
        EventService::new(self.ctx)
            .require_owned(host_id, message.event_id)
            .await?;

        self.ctx.media_repo().delete(media_id).await?;
        discard_blobs(self.ctx, &media).await;

        info!(media_id = %media_id, "Media file deleted");
        Ok(())
    }

    /// Bytes of a finished file, looked up by its storage id.
    ///
    /// Files of pending messages are only served to the event's host.
    #[instrument(skip(self))]
    pub async fn fetch_file(
        &self,
        storage_id: &str,
        caller: Option<&str>,
    ) -> ServiceResult<StoredFile> {
        let not_found = || DomainError::BlobNotFound(storage_id.to_string());

        let blob = self
            .ctx
            .blob_store()
            .stat(storage_id)
            .await?
            .ok_or_else(not_found)?;
        let media = self
            .ctx
            .media_repo()
            .find_by_id(blob.owner)
            .await?
            .filter(|m| m.is_complete() && m.storage_ref.as_deref() == Some(storage_id))
            .ok_or_else(not_found)?;
        self.visible_to(media.message_id, caller)
            .await?
            .ok_or_else(not_found)?;
        let bytes = self
            .ctx
            .blob_store()
            .read(storage_id)
            .await?
            .ok_or_else(not_found)?;

        Ok(StoredFile {
            file_name: media.file_name,
            mime_type: media.mime_type,
            bytes,
        })
    }

    /// Delete rows that never finished the pipeline and were last touched
    /// more than `max_age` ago, together with any file they uploaded.
    #[instrument(skip(self))]
    pub async fn sweep_incomplete(&self, max_age: Duration) -> ServiceResult<SweepOutcome> {
        let cutoff = Utc::now() - max_age;
        let stale = self.ctx.media_repo().find_incomplete_before(cutoff).await?;
        if stale.is_empty() {
            return Ok(SweepOutcome::default());
        }

        let ids: Vec<Snowflake> = stale.iter().map(|m| m.id).collect();
        let media_deleted = self.ctx.media_repo().delete_pending(&ids, cutoff).await?;

        // A row that moved since the scan survives delete_pending; keep its file
        let mut blobs_deleted = 0;
        for media in &stale {
            if self.ctx.media_repo().find_by_id(media.id).await?.is_none() {
                blobs_deleted += discard_blobs(self.ctx, media).await;
            }
        }

        if media_deleted > 0 {
            info!(media_deleted, blobs_deleted, "Swept incomplete media");
        }

        Ok(SweepOutcome {
            media_deleted,
            blobs_deleted,
        })
    }

    /// Finished media of an event's messages matching `filter`
    async fn event_media(
        &self,
        event_id: Snowflake,
        filter: MessageFilter,
    ) -> ServiceResult<(Vec<Message>, Vec<MediaFile>)> {
        let messages = self
            .ctx
            .message_repo()
            .find_by_event(event_id, filter)
            .await?;
        if messages.is_empty() {
            return Ok((messages, Vec::new()));
        }

        let ids: Vec<Snowflake> = messages.iter().map(|m| m.id).collect();
        let media = finished(self.ctx.media_repo().find_by_messages(&ids).await?);
        Ok((messages, media))
    }

    /// Whether `caller` may see the message at all, and if so whether they host it
    async fn visible_to(
        &self,
        message_id: Snowflake,
        caller: Option<&str>,
    ) -> ServiceResult<Option<bool>> {
        match MessageService::new(self.ctx)
            .find_visible(message_id, caller)
            .await
        {
            Ok((_, is_host)) => Ok(Some(is_host)),
            Err(ServiceError::Domain(DomainError::MessageNotFound(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find(&self, media_id: Snowflake) -> ServiceResult<MediaFile> {
        self.ctx
            .media_repo()
            .find_by_id(media_id)
            .await?
            .ok_or_else(|| DomainError::MediaFileNotFound(media_id).into())
    }

    /// Persist `next` if the row is still where `media` says it is
    async fn advance(&self, media: &MediaFile, next: &PipelineState) -> ServiceResult<()> {
        if self
            .ctx
            .media_repo()
            .update_state(media.id, &media.state, next)
            .await?
        {
            Ok(())
        } else {
            Err(DomainError::StageConflict(media.id).into())
        }
    }

    async fn mark_failed(&self, media: &MediaFile, reason: String) {
        let Ok(failed) = media.state.transition(PipelineEvent::Fail { reason }) else {
            return;
        };
        if let Err(e) = self.advance(media, &failed).await {
            warn!(media_id = %media.id, error = %e, "Could not record pipeline failure");
        }
    }
}

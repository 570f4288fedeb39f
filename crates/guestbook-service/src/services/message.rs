//! Message service
//!
//! Guest submissions, host-aware listing, and moderation.

use std::collections::HashMap;

use guestbook_core::entities::{MediaFile, Message, MessageFilter};
use guestbook_core::{DomainError, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{MessageResponse, RejectMessageResponse, SubmitMessageRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::event::EventService;
use super::media::discard_blobs;

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Submit a guest message. It stays hidden until the host approves it.
    #[instrument(skip(self, request), fields(message_type = %request.message_type))]
    pub async fn submit_message(
        &self,
        event_id: Snowflake,
        request: SubmitMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        request.validate()?;

        let event = EventService::new(self.ctx).find(event_id).await?;
        if !event.is_active {
            return Err(DomainError::EventInactive(event_id).into());
        }

        let message = Message::new(
            self.ctx.generate_id(),
            event_id,
            request.guest_name.trim().to_string(),
            request.message_type,
        )
        .with_email(request.guest_email)
        .with_text(request.message_text);
        message.validate()?;

        // The insert re-checks the event, so a concurrent deactivation wins
        if !self
            .ctx
            .message_repo()
            .create_for_active_event(&message)
            .await?
        {
            return Err(DomainError::EventInactive(event_id).into());
        }

        info!(message_id = %message.id, event_id = %event_id, "Message submitted");

        Ok(MessageResponse::for_viewer(message, &[], false))
    }

    /// Messages of an event with their finished media, newest first.
    ///
    /// `caller` is the verified host identity, if any. Anyone who is not the
    /// event's host sees approved messages only, whatever `filter` says.
    #[instrument(skip(self))]
    pub async fn list_messages(
        &self,
        event_id: Snowflake,
        caller: Option<&str>,
        filter: MessageFilter,
    ) -> ServiceResult<Vec<MessageResponse>> {
        let event = EventService::new(self.ctx).find(event_id).await?;
        let is_host = caller.is_some_and(|host_id| event.is_hosted_by(host_id));
        let filter = if is_host {
            filter
        } else {
            MessageFilter::Approved
        };

        let messages = self
            .ctx
            .message_repo()
            .find_by_event(event_id, filter)
            .await?;
        let mut media = self.finished_media_for(&messages).await?;

        Ok(messages
            .into_iter()
            .map(|message| {
                let files = media.remove(&message.id).unwrap_or_default();
                MessageResponse::for_viewer(message, &files, is_host)
            })
            .collect())
    }

    /// Single message. Pending messages do not exist for non-hosts.
    #[instrument(skip(self))]
    pub async fn get_message(
        &self,
        message_id: Snowflake,
        caller: Option<&str>,
    ) -> ServiceResult<MessageResponse> {
        let (message, is_host) = self.find_visible(message_id, caller).await?;
        let media = finished(self.ctx.media_repo().find_by_message(message_id).await?);

        Ok(MessageResponse::for_viewer(message, &media, is_host))
    }

    /// Approve a message. Approving twice is not an error.
    #[instrument(skip(self))]
    pub async fn approve_message(
        &self,
        host_id: &str,
        message_id: Snowflake,
    ) -> ServiceResult<MessageResponse> {
        let mut message = self.find(message_id).await?;
        EventService::new(self.ctx)
            .require_owned(host_id, message.event_id)
            .await?;

        if message.approve() {
            self.ctx.message_repo().approve(message_id).await?;
            info!(message_id = %message_id, "Message approved");
        }

        let media = finished(self.ctx.media_repo().find_by_message(message_id).await?);
        Ok(MessageResponse::for_viewer(message, &media, true))
    }

    /// Delete a message and every media row attached to it.
    ///
    /// Rows go in one transaction; stored files are removed afterwards and a
    /// failure there only leaves an unreferenced file behind.
    #[instrument(skip(self))]
    pub async fn reject_message(
        &self,
        host_id: &str,
        message_id: Snowflake,
    ) -> ServiceResult<RejectMessageResponse> {
        let message = self.find(message_id).await?;
        EventService::new(self.ctx)
            .require_owned(host_id, message.event_id)
            .await?;

        let media = self.ctx.media_repo().find_by_message(message_id).await?;
        let deleted_media_files = self.ctx.message_repo().delete_with_media(message_id).await?;

        for file in &media {
            discard_blobs(self.ctx, file).await;
        }

        info!(
            message_id = %message_id,
            deleted_media_files,
            "Message rejected"
        );

        Ok(RejectMessageResponse {
            message_id: message_id.to_string(),
            deleted_media_files,
        })
    }

    /// Load a message, hiding it from non-hosts until approved.
    ///
    /// Returns whether `caller` hosts the message's event.
    pub(crate) async fn find_visible(
        &self,
        message_id: Snowflake,
        caller: Option<&str>,
    ) -> ServiceResult<(Message, bool)> {
        let message = self.find(message_id).await?;
        let event = EventService::new(self.ctx).find(message.event_id).await?;
        let is_host = caller.is_some_and(|host_id| event.is_hosted_by(host_id));

        if !message.is_approved && !is_host {
            return Err(DomainError::MessageNotFound(message_id).into());
        }
        Ok((message, is_host))
    }

    pub(crate) async fn find(&self, message_id: Snowflake) -> ServiceResult<Message> {
        self.ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| DomainError::MessageNotFound(message_id).into())
    }

    async fn finished_media_for(
        &self,
        messages: &[Message],
    ) -> ServiceResult<HashMap<Snowflake, Vec<MediaFile>>> {
        if messages.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<Snowflake> = messages.iter().map(|m| m.id).collect();
        let media = self.ctx.media_repo().find_by_messages(&ids).await?;

        let mut grouped: HashMap<Snowflake, Vec<MediaFile>> = HashMap::new();
        for file in finished(media) {
            grouped.entry(file.message_id).or_default().push(file);
        }
        Ok(grouped)
    }
}

/// Keep only media that completed the pipeline
pub(crate) fn finished(media: Vec<MediaFile>) -> Vec<MediaFile> {
    media.into_iter().filter(MediaFile::is_complete).collect()
}

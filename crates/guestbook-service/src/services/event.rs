//! Event service
//!
//! Handles event creation, lookup by access code, host management, and stats.

use guestbook_core::entities::{Event, EventStats, MessageFilter};
use guestbook_core::{insert_unique, AccessCode, CodeKind, DomainError, Snowflake, ACCESS_CODE};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CreateEventRequest, EventResponse, UpdateEventRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Event service
pub struct EventService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> EventService<'a> {
    /// Create a new EventService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create an event with a fresh access code
    #[instrument(skip(self, request))]
    pub async fn create_event(
        &self,
        host_id: &str,
        request: CreateEventRequest,
    ) -> ServiceResult<EventResponse> {
        request.validate()?;
        if host_id.trim().is_empty() {
            return Err(ServiceError::forbidden("host identity required"));
        }

        let repo = self.ctx.event_repo();
        let event = insert_unique(
            CodeKind::AccessCode,
            || ACCESS_CODE.generate(),
            |code| {
                let candidate = AccessCode::parse(&code).map(|code| {
                    Event::new(
                        self.ctx.generate_id(),
                        request.title.clone(),
                        request.date,
                        host_id.to_string(),
                        code,
                    )
                    .with_description(request.description.clone())
                    .with_location(request.location.clone())
                });
                async move {
                    let event = candidate?;
                    repo.create(&event).await?;
                    Ok(event)
                }
            },
        )
        .await?;

        info!(event_id = %event.id, access_code = %event.access_code, "Event created");

        Ok(EventResponse::from(event))
    }

    /// Events owned by a host, newest first
    #[instrument(skip(self))]
    pub async fn list_host_events(&self, host_id: &str) -> ServiceResult<Vec<EventResponse>> {
        let events = self.ctx.event_repo().find_by_host(host_id).await?;
        Ok(events.into_iter().map(EventResponse::from).collect())
    }

    /// Get event by ID
    #[instrument(skip(self))]
    pub async fn get_event(&self, event_id: Snowflake) -> ServiceResult<EventResponse> {
        self.find(event_id).await.map(EventResponse::from)
    }

    /// Look up an event by the code a guest typed in, ignoring case.
    ///
    /// Inactive events are returned too so the guest can be told why they
    /// cannot post.
    #[instrument(skip(self))]
    pub async fn get_event_by_access_code(&self, input: &str) -> ServiceResult<EventResponse> {
        let code = AccessCode::parse(input)?;
        let event = self
            .ctx
            .event_repo()
            .find_by_access_code(&code)
            .await?
            .ok_or_else(|| DomainError::AccessCodeNotFound(code.into_inner()))?;

        Ok(EventResponse::from(event))
    }

    /// All active events, newest first
    #[instrument(skip(self))]
    pub async fn list_active_events(&self) -> ServiceResult<Vec<EventResponse>> {
        let events = self.ctx.event_repo().find_active().await?;
        Ok(events.into_iter().map(EventResponse::from).collect())
    }

    /// Partial update by the owning host
    #[instrument(skip(self, request))]
    pub async fn update_event(
        &self,
        host_id: &str,
        event_id: Snowflake,
        request: UpdateEventRequest,
    ) -> ServiceResult<EventResponse> {
        request.validate()?;
        let changes = request.into_changes()?;

        let mut event = self.require_owned(host_id, event_id).await?;
        if event.apply(changes) {
            self.ctx.event_repo().update(&event).await?;
            info!(event_id = %event_id, is_active = event.is_active, "Event updated");
        }

        Ok(EventResponse::from(event))
    }

    /// Soft delete. Deactivating an inactive event is a no-op.
    #[instrument(skip(self))]
    pub async fn deactivate_event(
        &self,
        host_id: &str,
        event_id: Snowflake,
    ) -> ServiceResult<EventResponse> {
        let mut event = self.require_owned(host_id, event_id).await?;
        if event.deactivate() {
            self.ctx.event_repo().update(&event).await?;
            info!(event_id = %event_id, "Event deactivated");
        }

        Ok(EventResponse::from(event))
    }

    /// Message counts for the host dashboard
    #[instrument(skip(self))]
    pub async fn event_stats(&self, host_id: &str, event_id: Snowflake) -> ServiceResult<EventStats> {
        self.require_owned(host_id, event_id).await?;
        let messages = self
            .ctx
            .message_repo()
            .find_by_event(event_id, MessageFilter::All)
            .await?;

        Ok(EventStats::tally(&messages))
    }

    /// Load an event, failing unless `host_id` owns it
    pub async fn require_owned(&self, host_id: &str, event_id: Snowflake) -> ServiceResult<Event> {
        let event = self.find(event_id).await?;
        if !event.is_hosted_by(host_id) {
            return Err(DomainError::NotEventHost.into());
        }
        Ok(event)
    }

    pub(crate) async fn find(&self, event_id: Snowflake) -> ServiceResult<Event> {
        self.ctx
            .event_repo()
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| DomainError::EventNotFound(event_id).into())
    }
}

//! Message handlers
//!
//! Guest submission, host-aware listing, and moderation.

use axum::{
    extract::{Path, State},
    Json,
};
use guestbook_service::dto::{MessageResponse, RejectMessageResponse, SubmitMessageRequest};
use guestbook_service::MessageService;

use crate::extractors::{
    EventIdPath, HostUser, MessageIdPath, MessageListParams, OptionalHostUser, QueryParams,
    ValidatedJson,
};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Submit a message to an event
///
/// POST /events/{event_id}/messages
pub async fn submit_message(
    State(state): State<AppState>,
    Path(path): Path<EventIdPath>,
    ValidatedJson(request): ValidatedJson<SubmitMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let response = service.submit_message(path.event_id()?, request).await?;
    Ok(Created(Json(response)))
}

/// List messages of an event
///
/// GET /events/{event_id}/messages
///
/// Anyone but the event's host gets approved messages only, whatever
/// `filter` says.
pub async fn list_messages(
    State(state): State<AppState>,
    caller: OptionalHostUser,
    Path(path): Path<EventIdPath>,
    QueryParams(params): QueryParams<MessageListParams>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let messages = service
        .list_messages(path.event_id()?, caller.host_id(), params.filter)
        .await?;
    Ok(Json(messages))
}

/// Get message by ID
///
/// GET /messages/{message_id}
pub async fn get_message(
    State(state): State<AppState>,
    caller: OptionalHostUser,
    Path(path): Path<MessageIdPath>,
) -> ApiResult<Json<MessageResponse>> {
    let service = MessageService::new(state.service_context());
    let response = service
        .get_message(path.message_id()?, caller.host_id())
        .await?;
    Ok(Json(response))
}

/// Approve message
///
/// POST /messages/{message_id}/approve
pub async fn approve_message(
    State(state): State<AppState>,
    host: HostUser,
    Path(path): Path<MessageIdPath>,
) -> ApiResult<Json<MessageResponse>> {
    let service = MessageService::new(state.service_context());
    let response = service
        .approve_message(&host.host_id, path.message_id()?)
        .await?;
    Ok(Json(response))
}

/// Reject message together with its media
///
/// DELETE /messages/{message_id}
pub async fn reject_message(
    State(state): State<AppState>,
    host: HostUser,
    Path(path): Path<MessageIdPath>,
) -> ApiResult<Json<RejectMessageResponse>> {
    let service = MessageService::new(state.service_context());
    let response = service
        .reject_message(&host.host_id, path.message_id()?)
        .await?;
    Ok(Json(response))
}

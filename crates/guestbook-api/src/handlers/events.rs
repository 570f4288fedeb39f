//! Event handlers
//!
//! Public lookup by id or access code, and host management.

use axum::{
    extract::{Path, State},
    Json,
};
use guestbook_core::EventStats;
use guestbook_service::dto::{CreateEventRequest, EventResponse, UpdateEventRequest};
use guestbook_service::EventService;

use crate::extractors::{EventIdPath, HostUser, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Create event
///
/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    host: HostUser,
    ValidatedJson(request): ValidatedJson<CreateEventRequest>,
) -> ApiResult<Created<Json<EventResponse>>> {
    let service = EventService::new(state.service_context());
    let response = service.create_event(&host.host_id, request).await?;
    Ok(Created(Json(response)))
}

/// Events hosted by the caller
///
/// GET /events/mine
pub async fn list_host_events(
    State(state): State<AppState>,
    host: HostUser,
) -> ApiResult<Json<Vec<EventResponse>>> {
    let service = EventService::new(state.service_context());
    Ok(Json(service.list_host_events(&host.host_id).await?))
}

/// Active events
///
/// GET /events/active
pub async fn list_active_events(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<EventResponse>>> {
    let service = EventService::new(state.service_context());
    Ok(Json(service.list_active_events().await?))
}

/// Get event by ID
///
/// GET /events/{event_id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(path): Path<EventIdPath>,
) -> ApiResult<Json<EventResponse>> {
    let service = EventService::new(state.service_context());
    Ok(Json(service.get_event(path.event_id()?).await?))
}

/// Get event by access code, case-insensitive
///
/// GET /events/code/{access_code}
pub async fn get_event_by_access_code(
    State(state): State<AppState>,
    Path(access_code): Path<String>,
) -> ApiResult<Json<EventResponse>> {
    let service = EventService::new(state.service_context());
    Ok(Json(service.get_event_by_access_code(&access_code).await?))
}

/// Update event
///
/// PATCH /events/{event_id}
pub async fn update_event(
    State(state): State<AppState>,
    host: HostUser,
    Path(path): Path<EventIdPath>,
    ValidatedJson(request): ValidatedJson<UpdateEventRequest>,
) -> ApiResult<Json<EventResponse>> {
    let service = EventService::new(state.service_context());
    let response = service
        .update_event(&host.host_id, path.event_id()?, request)
        .await?;
    Ok(Json(response))
}

/// Deactivate event (soft delete)
///
/// DELETE /events/{event_id}
pub async fn deactivate_event(
    State(state): State<AppState>,
    host: HostUser,
    Path(path): Path<EventIdPath>,
) -> ApiResult<Json<EventResponse>> {
    let service = EventService::new(state.service_context());
    let response = service
        .deactivate_event(&host.host_id, path.event_id()?)
        .await?;
    Ok(Json(response))
}

/// Message counts
///
/// GET /events/{event_id}/stats
pub async fn event_stats(
    State(state): State<AppState>,
    host: HostUser,
    Path(path): Path<EventIdPath>,
) -> ApiResult<Json<EventStats>> {
    let service = EventService::new(state.service_context());
    Ok(Json(service.event_stats(&host.host_id, path.event_id()?).await?))
}

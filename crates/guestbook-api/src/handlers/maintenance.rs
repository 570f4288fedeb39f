//! Maintenance handlers

use axum::{extract::State, Json};
use guestbook_service::dto::CleanupResponse;
use guestbook_service::GuestTokenService;

use crate::extractors::HostUser;
use crate::response::ApiResult;
use crate::state::AppState;

/// Delete every expired guest token
///
/// POST /maintenance/cleanup-tokens
pub async fn cleanup_expired_tokens(
    State(state): State<AppState>,
    host: HostUser,
) -> ApiResult<Json<CleanupResponse>> {
    tracing::info!(host_id = %host.host_id, "Expired token cleanup requested");
    let service = GuestTokenService::new(state.service_context());
    Ok(Json(service.cleanup_expired_tokens().await?))
}

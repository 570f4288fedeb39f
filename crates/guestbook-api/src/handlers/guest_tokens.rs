//! Guest token handlers
//!
//! Hosts issue and manage tokens; anyone may validate one.

use axum::{
    extract::{Path, State},
    Json,
};
use guestbook_service::dto::{
    CreateGuestTokenRequest, CreateShareLinkRequest, CreatedTokenResponse, GuestTokenResponse,
    ShareLinkResponse, TokenValidationResponse, UpdateTokenExpirationRequest, ValidateTokenRequest,
};
use guestbook_service::GuestTokenService;

use crate::extractors::{
    EventIdPath, HostUser, OptionalValidatedJson, QueryParams, TokenIdPath, TokenListParams,
    ValidatedJson,
};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Issue a token
///
/// POST /events/{event_id}/guest-tokens
pub async fn create_token(
    State(state): State<AppState>,
    host: HostUser,
    Path(path): Path<EventIdPath>,
    OptionalValidatedJson(request): OptionalValidatedJson<CreateGuestTokenRequest>,
) -> ApiResult<Created<Json<CreatedTokenResponse>>> {
    let service = GuestTokenService::new(state.service_context());
    let response = service
        .create_token(&host.host_id, path.event_id()?, request)
        .await?;
    Ok(Created(Json(response)))
}

/// Issue a token wrapped in a shareable URL
///
/// POST /events/{event_id}/share-links
pub async fn create_shareable_link(
    State(state): State<AppState>,
    host: HostUser,
    Path(path): Path<EventIdPath>,
    OptionalValidatedJson(request): OptionalValidatedJson<CreateShareLinkRequest>,
) -> ApiResult<Created<Json<ShareLinkResponse>>> {
    let service = GuestTokenService::new(state.service_context());
    let response = service
        .create_shareable_link(&host.host_id, path.event_id()?, request)
        .await?;
    Ok(Created(Json(response)))
}

/// Tokens of an event
///
/// GET /events/{event_id}/guest-tokens
pub async fn list_tokens(
    State(state): State<AppState>,
    host: HostUser,
    Path(path): Path<EventIdPath>,
    QueryParams(params): QueryParams<TokenListParams>,
) -> ApiResult<Json<Vec<GuestTokenResponse>>> {
    let service = GuestTokenService::new(state.service_context());
    let event_id = path.event_id()?;
    let tokens = if params.active {
        service.list_active_tokens(&host.host_id, event_id).await?
    } else {
        service.list_tokens(&host.host_id, event_id).await?
    };
    Ok(Json(tokens))
}

/// Validate a token
///
/// POST /guest-tokens/validate
///
/// Always 200: an unusable token is reported in the body with its reason.
pub async fn validate_token(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ValidateTokenRequest>,
) -> ApiResult<Json<TokenValidationResponse>> {
    let service = GuestTokenService::new(state.service_context());
    let outcome = service.validate_token(&request.token).await?;
    Ok(Json(TokenValidationResponse::from(outcome)))
}

/// Deactivate a token
///
/// POST /guest-tokens/{token_id}/deactivate
pub async fn deactivate_token(
    State(state): State<AppState>,
    host: HostUser,
    Path(path): Path<TokenIdPath>,
) -> ApiResult<Json<GuestTokenResponse>> {
    let service = GuestTokenService::new(state.service_context());
    let response = service
        .deactivate_token(&host.host_id, path.token_id()?)
        .await?;
    Ok(Json(response))
}

/// Change or clear a token's expiry
///
/// PATCH /guest-tokens/{token_id}
pub async fn update_token_expiration(
    State(state): State<AppState>,
    host: HostUser,
    Path(path): Path<TokenIdPath>,
    ValidatedJson(request): ValidatedJson<UpdateTokenExpirationRequest>,
) -> ApiResult<Json<GuestTokenResponse>> {
    let service = GuestTokenService::new(state.service_context());
    let response = service
        .update_token_expiration(&host.host_id, path.token_id()?, request)
        .await?;
    Ok(Json(response))
}

/// Delete a token
///
/// DELETE /guest-tokens/{token_id}
pub async fn delete_token(
    State(state): State<AppState>,
    host: HostUser,
    Path(path): Path<TokenIdPath>,
) -> ApiResult<NoContent> {
    let service = GuestTokenService::new(state.service_context());
    service.delete_token(&host.host_id, path.token_id()?).await?;
    Ok(NoContent)
}

//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};

use crate::handlers::{events, guest_tokens, health, maintenance, media, messages};
use crate::state::AppState;

/// Create the main API router (health is separate so it bypasses rate limiting)
///
/// `max_upload_bytes` lifts the default body limit on the upload target only.
pub fn create_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes(max_upload_bytes))
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(event_routes())
        .merge(message_routes())
        .merge(media_routes(max_upload_bytes))
        .merge(guest_token_routes())
        .merge(maintenance_routes())
}

/// Event routes
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(events::create_event))
        .route("/events/mine", get(events::list_host_events))
        .route("/events/active", get(events::list_active_events))
        .route("/events/code/:access_code", get(events::get_event_by_access_code))
        .route(
            "/events/:event_id",
            get(events::get_event)
                .patch(events::update_event)
                .delete(events::deactivate_event),
        )
        .route("/events/:event_id/stats", get(events::event_stats))
}

/// Message routes
fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/events/:event_id/messages",
            get(messages::list_messages).post(messages::submit_message),
        )
        .route(
            "/messages/:message_id",
            get(messages::get_message).delete(messages::reject_message),
        )
        .route("/messages/:message_id/approve", post(messages::approve_message))
}

/// Media pipeline and file routes
fn media_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/messages/:message_id/media",
            get(media::list_media_by_message).post(media::submit_metadata),
        )
        .route(
            "/media/:media_id",
            get(media::get_media_file).delete(media::delete_media_file),
        )
        .route("/media/:media_id/upload-url", post(media::request_upload_url))
        .route("/media/:media_id/finalize", post(media::finalize))
        .route("/media/:media_id/failure", post(media::report_failure))
        .route(
            "/uploads/:slot",
            put(media::upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/files/:storage_id", get(media::download_file))
        .route("/events/:event_id/media", get(media::list_media_by_event))
        .route("/events/:event_id/media/stats", get(media::media_stats))
}

/// Guest token routes
fn guest_token_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/events/:event_id/guest-tokens",
            get(guest_tokens::list_tokens).post(guest_tokens::create_token),
        )
        .route(
            "/events/:event_id/share-links",
            post(guest_tokens::create_shareable_link),
        )
        .route("/guest-tokens/validate", post(guest_tokens::validate_token))
        .route(
            "/guest-tokens/:token_id",
            patch(guest_tokens::update_token_expiration)
                .delete(guest_tokens::delete_token),
        )
        .route(
            "/guest-tokens/:token_id/deactivate",
            post(guest_tokens::deactivate_token),
        )
}

/// Maintenance routes
fn maintenance_routes() -> Router<AppState> {
    Router::new().route(
        "/maintenance/cleanup-tokens",
        post(maintenance::cleanup_expired_tokens),
    )
}

//! Media handlers
//!
//! The server-side half of the upload pipeline: metadata, upload URL, the
//! upload target itself, finalize, and failure reports. Also listing,
//! stats, deletion and file download.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use guestbook_core::MediaStats;
use guestbook_service::dto::{
    FinalizeMediaRequest, MediaFileResponse, MediaWithMessageResponse, ReportFailureRequest,
    StoredFile, SubmitMediaRequest, UploadResponse, UploadUrlResponse,
};
use guestbook_service::MediaService;

use crate::extractors::{
    EventIdPath, HostUser, MediaIdPath, MediaListParams, MessageIdPath, OptionalHostUser,
    QueryParams, StorageIdPath, UploadSlotPath, ValidatedJson,
};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Record file metadata for a message
///
/// POST /messages/{message_id}/media
pub async fn submit_metadata(
    State(state): State<AppState>,
    Path(path): Path<MessageIdPath>,
    ValidatedJson(request): ValidatedJson<SubmitMediaRequest>,
) -> ApiResult<Created<Json<MediaFileResponse>>> {
    let service = MediaService::new(state.service_context());
    let response = service.submit_metadata(path.message_id()?, request).await?;
    Ok(Created(Json(response)))
}

/// Issue a single-use upload URL
///
/// POST /media/{media_id}/upload-url
pub async fn request_upload_url(
    State(state): State<AppState>,
    Path(path): Path<MediaIdPath>,
) -> ApiResult<Json<UploadUrlResponse>> {
    let service = MediaService::new(state.service_context());
    Ok(Json(service.request_upload_url(path.media_id()?).await?))
}

/// Upload target behind an issued URL; the body is the raw file
///
/// PUT /uploads/{slot}
pub async fn upload(
    State(state): State<AppState>,
    Path(path): Path<UploadSlotPath>,
    body: Bytes,
) -> ApiResult<Json<UploadResponse>> {
    let service = MediaService::new(state.service_context());
    Ok(Json(service.upload(&path.slot, &body).await?))
}

/// Bind an uploaded blob to its media row
///
/// POST /media/{media_id}/finalize
pub async fn finalize(
    State(state): State<AppState>,
    Path(path): Path<MediaIdPath>,
    ValidatedJson(request): ValidatedJson<FinalizeMediaRequest>,
) -> ApiResult<Json<MediaFileResponse>> {
    let service = MediaService::new(state.service_context());
    Ok(Json(service.finalize(path.media_id()?, request).await?))
}

/// Record a client-side pipeline failure
///
/// POST /media/{media_id}/failure
pub async fn report_failure(
    State(state): State<AppState>,
    Path(path): Path<MediaIdPath>,
    ValidatedJson(request): ValidatedJson<ReportFailureRequest>,
) -> ApiResult<Json<MediaFileResponse>> {
    let service = MediaService::new(state.service_context());
    Ok(Json(service.report_failure(path.media_id()?, request).await?))
}

/// Get media file by ID
///
/// GET /media/{media_id}
pub async fn get_media_file(
    State(state): State<AppState>,
    caller: OptionalHostUser,
    Path(path): Path<MediaIdPath>,
) -> ApiResult<Json<MediaFileResponse>> {
    let service = MediaService::new(state.service_context());
    let media = service
        .get_media_file(path.media_id()?, caller.host_id())
        .await?;
    Ok(Json(media))
}

/// Media of one message
///
/// GET /messages/{message_id}/media
pub async fn list_media_by_message(
    State(state): State<AppState>,
    caller: OptionalHostUser,
    Path(path): Path<MessageIdPath>,
) -> ApiResult<Json<Vec<MediaFileResponse>>> {
    let service = MediaService::new(state.service_context());
    let media = service
        .list_media_by_message(path.message_id()?, caller.host_id())
        .await?;
    Ok(Json(media))
}

/// All media of an event with message summaries
///
/// GET /events/{event_id}/media
pub async fn list_media_by_event(
    State(state): State<AppState>,
    host: HostUser,
    Path(path): Path<EventIdPath>,
    QueryParams(params): QueryParams<MediaListParams>,
) -> ApiResult<Json<Vec<MediaWithMessageResponse>>> {
    let service = MediaService::new(state.service_context());
    let media = service
        .list_media_by_event(&host.host_id, path.event_id()?, params.approved_only)
        .await?;
    Ok(Json(media))
}

/// Storage usage of an event
///
/// GET /events/{event_id}/media/stats
pub async fn media_stats(
    State(state): State<AppState>,
    host: HostUser,
    Path(path): Path<EventIdPath>,
) -> ApiResult<Json<MediaStats>> {
    let service = MediaService::new(state.service_context());
    Ok(Json(service.media_stats(&host.host_id, path.event_id()?).await?))
}

/// Delete media file and its blob
///
/// DELETE /media/{media_id}
pub async fn delete_media_file(
    State(state): State<AppState>,
    host: HostUser,
    Path(path): Path<MediaIdPath>,
) -> ApiResult<NoContent> {
    let service = MediaService::new(state.service_context());
    service
        .delete_media_file(&host.host_id, path.media_id()?)
        .await?;
    Ok(NoContent)
}

/// Download a finalized file
///
/// GET /files/{storage_id}
pub async fn download_file(
    State(state): State<AppState>,
    caller: OptionalHostUser,
    Path(path): Path<StorageIdPath>,
) -> ApiResult<Response> {
    let service = MediaService::new(state.service_context());
    let file = service
        .fetch_file(&path.storage_id, caller.host_id())
        .await?;

    Ok((file_headers(&file), file.bytes).into_response())
}

/// Guest-supplied types are only trusted for images, audio and video.
/// Anything else is sent as an opaque attachment.
fn file_headers(file: &StoredFile) -> [(HeaderName, HeaderValue); 3] {
    let mime = file.mime_type.trim().to_ascii_lowercase();
    let playable = ["image/", "audio/", "video/"]
        .iter()
        .any(|prefix| mime.starts_with(prefix))
        && !mime.starts_with("image/svg");

    let content_type = if playable {
        HeaderValue::from_str(&mime).ok()
    } else {
        None
    }
    .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    let mode = if playable { "inline" } else { "attachment" };
    let file_name: String = file
        .file_name
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect();
    let disposition = HeaderValue::from_str(&format!("{mode}; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static(mode));

    [
        (header::CONTENT_TYPE, content_type),
        (header::CONTENT_DISPOSITION, disposition),
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(file_name: &str, mime_type: &str) -> StoredFile {
        StoredFile {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes: Vec::new(),
        }
    }

    fn header_value<'a>(headers: &'a [(HeaderName, HeaderValue); 3], name: &HeaderName) -> &'a str {
        headers
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.to_str().ok())
            .unwrap()
    }

    #[test]
    fn test_media_types_served_inline() {
        let headers = file_headers(&stored("first-dance.jpg", "image/jpeg"));
        assert_eq!(header_value(&headers, &header::CONTENT_TYPE), "image/jpeg");
        assert_eq!(
            header_value(&headers, &header::CONTENT_DISPOSITION),
            "inline; filename=\"first-dance.jpg\""
        );
        assert_eq!(header_value(&headers, &header::X_CONTENT_TYPE_OPTIONS), "nosniff");
    }

    #[test]
    fn test_other_types_forced_to_attachment() {
        for mime in ["text/html", "image/svg+xml", "application/javascript", "not a mime"] {
            let headers = file_headers(&stored("toast.html", mime));
            assert_eq!(
                header_value(&headers, &header::CONTENT_TYPE),
                "application/octet-stream"
            );
            assert!(header_value(&headers, &header::CONTENT_DISPOSITION).starts_with("attachment"));
            assert_eq!(header_value(&headers, &header::X_CONTENT_TYPE_OPTIONS), "nosniff");
        }
    }

    #[test]
    fn test_file_name_quotes_stripped() {
        let headers = file_headers(&stored("a\"b.mp3", "audio/mpeg"));
        assert_eq!(
            header_value(&headers, &header::CONTENT_DISPOSITION),
            "inline; filename=\"ab.mp3\""
        );
    }
}

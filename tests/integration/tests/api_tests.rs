//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Environment variables: DATABASE_URL, JWT_SECRET
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_status, check_test_env, fixtures::*, TestServer,
};
use reqwest::StatusCode;
use serde_json::json;

async fn create_event(server: &TestServer, token: &str) -> EventResponse {
    let response = server
        .post("/events", Some(token), &CreateEventRequest::unique())
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn submit_text(server: &TestServer, event_id: &str, body: &str) -> MessageResponse {
    let response = server
        .post(
            &format!("/events/{event_id}/messages"),
            None,
            &SubmitMessageRequest::text(body),
        )
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get_raw("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get_raw("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Event Tests
// ============================================================================

#[tokio::test]
async fn test_create_event_requires_host_token() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let response = server
        .post("/events", None, &CreateEventRequest::unique())
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .post("/events", Some("not-a-jwt"), &CreateEventRequest::unique())
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_event_lookup_by_access_code_ignores_case() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let host = unique_host();
    let token = server.host_token(&host).unwrap();
    let event = create_event(&server, &token).await;

    assert_eq!(event.access_code.len(), 6);
    assert_eq!(event.host_id, host);
    assert!(event.is_active);

    let lower = event.access_code.to_ascii_lowercase();
    let response = server
        .get(&format!("/events/code/{lower}"), None)
        .await
        .unwrap();
    let found: EventResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(found.id, event.id);

    let response = server.get("/events/mine", Some(&token)).await.unwrap();
    let mine: Vec<EventResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].title, event.title);
}

#[tokio::test]
async fn test_malformed_ids_are_bad_requests() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let response = server.get("/events/not-a-number", None).await.unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "INVALID_PATH_PARAMETER");
}

#[tokio::test]
async fn test_only_host_may_update_event() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let token = server.host_token(&unique_host()).unwrap();
    let intruder = server.host_token(&unique_host()).unwrap();
    let event = create_event(&server, &token).await;

    let path = format!("/events/{}", event.id);
    let response = server
        .patch(&path, &intruder, &json!({ "title": "Hijacked" }))
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error.code, "NOT_EVENT_HOST");

    let response = server
        .patch(&path, &token, &json!({ "title": "Renamed" }))
        .await
        .unwrap();
    let updated: EventResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.access_code, event.access_code);
}

// ============================================================================
// Message Tests
// ============================================================================

#[tokio::test]
async fn test_guests_see_only_approved_messages() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let token = server.host_token(&unique_host()).unwrap();
    let event = create_event(&server, &token).await;

    let first = submit_text(&server, &event.id, "Congratulations!").await;
    submit_text(&server, &event.id, "So happy for you").await;
    assert!(!first.is_approved);

    let response = server
        .post_empty(&format!("/messages/{}/approve", first.id), Some(&token))
        .await
        .unwrap();
    let approved: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(approved.is_approved);

    // Asking for pending as a guest still yields approved only
    let list_path = format!("/events/{}/messages?filter=pending", event.id);
    let response = server.get(&list_path, None).await.unwrap();
    let guest_view: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(guest_view.len(), 1);
    assert_eq!(guest_view[0].id, first.id);
    assert!(guest_view[0].guest_email.is_none());

    let all_path = format!("/events/{}/messages", event.id);
    let response = server.get(&all_path, Some(&token)).await.unwrap();
    let host_view: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(host_view.len(), 2);
    assert!(host_view.iter().all(|m| m.guest_email.is_some()));
}

#[tokio::test]
async fn test_approve_is_idempotent() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let token = server.host_token(&unique_host()).unwrap();
    let event = create_event(&server, &token).await;
    let message = submit_text(&server, &event.id, "Cheers").await;

    let path = format!("/messages/{}/approve", message.id);
    for _ in 0..2 {
        let response = server.post_empty(&path, Some(&token)).await.unwrap();
        let approved: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
        assert!(approved.is_approved);
    }
}

#[tokio::test]
async fn test_submit_to_inactive_event_is_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let token = server.host_token(&unique_host()).unwrap();
    let event = create_event(&server, &token).await;

    let response = server
        .delete(&format!("/events/{}", event.id), &token)
        .await
        .unwrap();
    let closed: EventResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!closed.is_active);

    let response = server
        .post(
            &format!("/events/{}/messages", event.id),
            None,
            &SubmitMessageRequest::text("Too late"),
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(body.error.code, "EVENT_INACTIVE");
}

// ============================================================================
// Media Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_media_pipeline_and_cascading_reject() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let token = server.host_token(&unique_host()).unwrap();
    let event = create_event(&server, &token).await;

    let response = server
        .post(
            &format!("/events/{}/messages", event.id),
            None,
            &SubmitMessageRequest::photo(),
        )
        .await
        .unwrap();
    let message: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let bytes = b"not really a jpeg".to_vec();
    let media_path = format!("/messages/{}/media", message.id);
    let response = server
        .post(&media_path, None, &SubmitMediaRequest::jpeg(bytes.len()))
        .await
        .unwrap();
    let media: MediaFileResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(media.stage, "metadata_submitted");

    // A second, abandoned row stays pending
    server
        .post(&media_path, None, &SubmitMediaRequest::jpeg(4))
        .await
        .unwrap();

    let response = server
        .post_empty(&format!("/media/{}/upload-url", media.id), None)
        .await
        .unwrap();
    let slot: UploadUrlResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server.put_bytes(&slot.upload_url, bytes.clone()).await.unwrap();
    let uploaded: UploadResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(uploaded.size, bytes.len() as u64);

    // Upload URLs are single use
    let response = server.put_bytes(&slot.upload_url, bytes.clone()).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .post(
            &format!("/media/{}/finalize", media.id),
            None,
            &FinalizeRequest {
                storage_id: uploaded.storage_id.clone(),
            },
        )
        .await
        .unwrap();
    let finalized: MediaFileResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(finalized.stage, "finalized");
    let file_url = finalized.storage_url.expect("finalized media has a URL");

    // The message is still pending, so only the host can reach the media
    let response = server.client.get(&file_url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = server
        .get(&format!("/media/{}", media.id), None)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .client
        .get(&file_url)
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), bytes.as_slice());

    // Host sees only the finished row attached to the message
    let response = server
        .get(&format!("/messages/{}", message.id), Some(&token))
        .await
        .unwrap();
    let with_media: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(with_media.media_files.len(), 1);

    let response = server
        .delete(&format!("/messages/{}", message.id), &token)
        .await
        .unwrap();
    let rejected: RejectMessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(rejected.deleted_media_files, 2);

    let response = server
        .client
        .get(&file_url)
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_text_messages_take_no_media() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let token = server.host_token(&unique_host()).unwrap();
    let event = create_event(&server, &token).await;
    let message = submit_text(&server, &event.id, "With a picture").await;

    let response = server
        .post(
            &format!("/messages/{}/media", message.id),
            None,
            &SubmitMediaRequest::jpeg(10),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Guest Token Tests
// ============================================================================

#[tokio::test]
async fn test_guest_token_lifecycle() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let token = server.host_token(&unique_host()).unwrap();
    let event = create_event(&server, &token).await;

    let response = server
        .post(
            &format!("/events/{}/share-links", event.id),
            Some(&token),
            &json!({ "expires_in_days": 7 }),
        )
        .await
        .unwrap();
    let link: ShareLinkResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(link.token.len(), 32);
    assert!(link.shareable_url.ends_with(&format!("/guest/{}", link.token)));

    let response = server
        .post_empty(&format!("/events/{}/guest-tokens", event.id), Some(&token))
        .await
        .unwrap();
    let created: CreatedTokenResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let validate = |value: String| {
        let server = &server;
        async move {
            let response = server
                .post("/guest-tokens/validate", None, &ValidateTokenRequest { token: value })
                .await
                .unwrap();
            assert_json::<TokenValidationResponse>(response, StatusCode::OK)
                .await
                .unwrap()
        }
    };

    let outcome = validate(created.token.clone()).await;
    assert!(outcome.valid);
    assert_eq!(outcome.event.map(|e| e.id), Some(event.id.clone()));

    let outcome = validate("x".repeat(32)).await;
    assert!(!outcome.valid);
    assert_eq!(outcome.reason.as_deref(), Some("not_found"));

    let response = server
        .post_empty(&format!("/guest-tokens/{}/deactivate", created.id), Some(&token))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let outcome = validate(created.token.clone()).await;
    assert_eq!(outcome.reason.as_deref(), Some("inactive"));

    let response = server
        .post_empty("/maintenance/cleanup-tokens", Some(&token))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

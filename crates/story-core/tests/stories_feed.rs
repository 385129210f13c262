//! Integration tests for the story feed and push subscription clients.

mod common;

use std::sync::Arc;

use common::{Harness, TOKEN, can_bind_localhost, failure, ok, story_json};
use serde_json::json;
use story_core::api::{ErrorCode, classify};
use story_core::push::{PushClient, PushSubscription, SubscriptionKeys};
use story_core::stories::{NewStory, Photo, StoryClient};
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn photo() -> Photo {
    Photo::new("sunset.png", "image/png", vec![0x89, b'P', b'N', b'G'])
}

#[tokio::test]
async fn test_list_sends_paging_and_location_flag() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let harness = Harness::start().await;
    harness.log_in();
    let stories = StoryClient::new(Arc::clone(&harness.client));

    Mock::given(method("GET"))
        .and(path("/v1/stories"))
        .and(query_param("page", "1"))
        .and(query_param("size", "10"))
        .and(query_param("location", "1"))
        .respond_with(ok(json!({
            "error": false,
            "message": "Stories fetched successfully",
            "listStory": [story_json("story-1"), story_json("story-2")]
        })))
        .expect(1)
        .mount(&harness.server)
        .await;

    let entries = stories.list(1, 10, true).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "story-1");
    assert_eq!(entries[1].location(), Some((-10.212, -16.002)));
}

#[tokio::test]
async fn test_get_story_by_id() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let harness = Harness::start().await;
    harness.log_in();
    let stories = StoryClient::new(Arc::clone(&harness.client));

    Mock::given(method("GET"))
        .and(path("/v1/stories/story-FvU4u0Vp2S3PMsFg"))
        .respond_with(ok(json!({
            "error": false,
            "message": "Story fetched successfully",
            "story": story_json("story-FvU4u0Vp2S3PMsFg")
        })))
        .mount(&harness.server)
        .await;

    let entry = stories.get("story-FvU4u0Vp2S3PMsFg").await.unwrap();
    assert_eq!(entry.description, "Lorem Ipsum");
}

#[tokio::test]
async fn test_get_encodes_id_as_path_segment() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let harness = Harness::start().await;
    harness.log_in();
    let stories = StoryClient::new(Arc::clone(&harness.client));

    Mock::given(method("GET"))
        .and(path("/v1/stories/story%201"))
        .respond_with(ok(json!({
            "error": false,
            "message": "Story fetched successfully",
            "story": story_json("story 1")
        })))
        .expect(1)
        .mount(&harness.server)
        .await;

    let entry = stories.get("story 1").await.unwrap();
    assert_eq!(entry.id, "story 1");
}

#[tokio::test]
async fn test_create_posts_multipart_with_location() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let harness = Harness::start().await;
    harness.log_in();
    let stories = StoryClient::new(Arc::clone(&harness.client));

    Mock::given(method("POST"))
        .and(path("/v1/stories"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(header_exists("content-type"))
        .respond_with(ok(json!({ "error": false, "message": "success" })))
        .expect(1)
        .mount(&harness.server)
        .await;

    let story = NewStory::new("Senja di pantai", photo())
        .unwrap()
        .with_location(-6.2, 106.8);
    let created = stories.create(&story).await.unwrap();

    assert_eq!(created.message, "success");
    assert_eq!(created.story, None);

    // The photo bytes are not UTF-8, so inspect the body lossily.
    let requests = harness.server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"description\""));
    assert!(body.contains("Senja di pantai"));
    assert!(body.contains("name=\"photo\"; filename=\"sunset.png\""));
    assert!(body.contains("Content-Type: image/png"));
    assert!(body.contains("name=\"lat\""));
    assert!(body.contains("-6.2"));
    assert!(body.contains("name=\"lon\""));
    assert!(body.contains("106.8"));
}

#[tokio::test]
async fn test_guest_create_uses_guest_endpoint() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let harness = Harness::start().await;
    let stories = StoryClient::new(Arc::clone(&harness.client));

    Mock::given(method("POST"))
        .and(path("/v1/stories/guest"))
        .and(header_exists("content-type"))
        .respond_with(ok(json!({ "error": false, "message": "success" })))
        .expect(1)
        .mount(&harness.server)
        .await;

    let story = NewStory::new("tamu", photo()).unwrap();
    let created = stories.create_as_guest(&story).await.unwrap();
    assert_eq!(created.message, "success");

    let requests = harness.server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("name=\"lat\""));
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_oversized_upload_rejected_by_server() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let harness = Harness::start().await;
    harness.log_in();
    let stories = StoryClient::new(Arc::clone(&harness.client));

    Mock::given(method("POST"))
        .and(path("/v1/stories"))
        .respond_with(failure(413, "Image too large"))
        .mount(&harness.server)
        .await;

    let story = NewStory::new("big", photo()).unwrap();
    let shown = classify(&stories.create(&story).await.unwrap_err());

    assert_eq!(shown.code, ErrorCode::FileTooLarge);
    assert_eq!(shown.message, "Image too large");
}

#[tokio::test]
async fn test_malformed_feed_is_decode_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let harness = Harness::start().await;
    harness.log_in();
    let stories = StoryClient::new(Arc::clone(&harness.client));

    Mock::given(method("GET"))
        .and(path("/v1/stories"))
        .respond_with(ok(json!({ "error": false, "listStory": [{ "id": 7 }] })))
        .mount(&harness.server)
        .await;

    let err = stories.list(1, 10, false).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ApiError);
    assert_eq!(err.status, 200);
}

#[tokio::test]
async fn test_push_subscribe_and_unsubscribe() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let harness = Harness::start().await;
    harness.log_in();
    let push = PushClient::new(Arc::clone(&harness.client));
    let subscription = PushSubscription {
        endpoint: "https://push.example/abc".to_string(),
        keys: SubscriptionKeys {
            p256dh: "BNc".to_string(),
            auth: "tBH".to_string(),
        },
    };

    Mock::given(method("POST"))
        .and(path("/v1/notifications/subscribe"))
        .and(body_json(json!({
            "endpoint": "https://push.example/abc",
            "keys": { "p256dh": "BNc", "auth": "tBH" }
        })))
        .respond_with(ok(json!({ "error": false, "message": "Success to subscribe web push notification." })))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/notifications/subscribe"))
        .and(body_json(json!({ "endpoint": "https://push.example/abc" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&harness.server)
        .await;

    let ack = push.subscribe(&subscription).await.unwrap();
    assert_eq!(ack.message, "Success to subscribe web push notification.");

    let ack = push.unsubscribe(&subscription.endpoint).await.unwrap();
    assert_eq!(ack.message, "");
}

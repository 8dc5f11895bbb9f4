#![allow(clippy::unwrap_used, clippy::panic, missing_debug_implementations, unreachable_pub)]
use reqwest::StatusCode;
mod common;

#[tokio::test]
async fn test_post_then_list_roundtrip() {
    let app = common::TestApp::spawn().await;
    let (room_id, token) = app.create_room().await;

    let resp = app.post_message(&token, "anonymous-fox-ab12c", "hello").await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.list_messages(&token).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);

    let msg = &messages[0];
    assert_eq!(msg["sender"], "anonymous-fox-ab12c");
    assert_eq!(msg["text"], "hello");
    assert_eq!(msg["roomId"], room_id.as_str());
    assert_eq!(msg["mine"], true);
    assert!(!msg["id"].as_str().unwrap().is_empty());
    assert!(msg["timestamp"].as_i64().unwrap() > 0);
    // The raw token must never come back in a read.
    assert!(msg.get("token").is_none());
    assert!(msg.get("tokenHash").is_none());
}

#[tokio::test]
async fn test_append_order_preserved() {
    let app = common::TestApp::spawn().await;
    let (_room_id, token) = app.create_room().await;

    for i in 0..5 {
        let resp = app.post_message(&token, "fox", &format!("msg-{i}")).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let body: serde_json::Value = app.list_messages(&token).await.json().await.unwrap();
    let texts: Vec<&str> = body["messages"].as_array().unwrap().iter().map(|m| m["text"].as_str().unwrap()).collect();
    assert_eq!(texts, ["msg-0", "msg-1", "msg-2", "msg-3", "msg-4"]);
}

#[tokio::test]
async fn test_text_length_boundary() {
    let app = common::TestApp::spawn().await;
    let (_room_id, token) = app.create_room().await;

    let resp = app.post_message(&token, "fox", &"x".repeat(1000)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.post_message(&token, "fox", &"x".repeat(1001)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sender_length_boundary() {
    let app = common::TestApp::spawn().await;
    let (_room_id, token) = app.create_room().await;

    let resp = app.post_message(&token, &"s".repeat(100), "hello").await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.post_message(&token, &"s".repeat(101), "hello").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rejected_input_leaves_no_trace() {
    let app = common::TestApp::spawn().await;
    let (_room_id, token) = app.create_room().await;

    app.post_message(&token, "fox", &"x".repeat(1001)).await;

    let body: serde_json::Value = app.list_messages(&token).await.json().await.unwrap();
    assert!(body["messages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_room_lists_empty() {
    let app = common::TestApp::spawn().await;
    let (_room_id, token) = app.create_room().await;

    let resp = app.list_messages(&token).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["messages"].as_array().unwrap().is_empty());
}

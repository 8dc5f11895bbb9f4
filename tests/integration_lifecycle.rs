#![allow(clippy::unwrap_used, clippy::panic, missing_debug_implementations, unreachable_pub)]
use reqwest::StatusCode;
use std::time::Duration;
use vanish_server::domain::RoomEvent;
use vanish_server::pubsub::{Broadcast, room_channel};
mod common;

#[tokio::test]
async fn test_room_expires_and_everything_vanishes() {
    let app = common::TestApp::spawn_with_lifetime(1).await;
    let (_room_id, token) = app.create_room().await;

    let resp = app.post_message(&token, "fox", "still alive").await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let body: serde_json::Value = app.room_ttl(&token).await.json().await.unwrap();
    assert_eq!(body["seconds"], 0);

    let resp = app.post_message(&token, "fox", "too late").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.list_messages(&token).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_destroy_cuts_off_stale_tokens() {
    let app = common::TestApp::spawn().await;
    let (_room_id, token) = app.create_room().await;

    app.post_message(&token, "fox", "hello").await;

    let resp = app.destroy_room(&token).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // The token still decodes, but every room-scoped operation now fails.
    let resp = app.list_messages(&token).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.post_message(&token, "fox", "anyone there?").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = app.room_ttl(&token).await.json().await.unwrap();
    assert_eq!(body["seconds"], 0);
}

#[tokio::test]
async fn test_destroy_emits_room_destroyed_event() {
    let app = common::TestApp::spawn().await;
    let (room_id, token) = app.create_room().await;

    let mut rx = app.bus.subscribe(&room_channel(&room_id)).await.unwrap();

    let resp = app.destroy_room(&token).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let msg = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
    let event: RoomEvent = serde_json::from_slice(&msg.payload).unwrap();
    assert_eq!(event, RoomEvent::destroyed());
}

#[tokio::test]
async fn test_post_emits_message_appended_event() {
    let app = common::TestApp::spawn().await;
    let (room_id, token) = app.create_room().await;

    let mut rx = app.bus.subscribe(&room_channel(&room_id)).await.unwrap();

    app.post_message(&token, "anonymous-cat-zz9", "ping").await;

    let msg = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
    match serde_json::from_slice::<RoomEvent>(&msg.payload).unwrap() {
        RoomEvent::MessageAppended(m) => {
            assert_eq!(m.sender, "anonymous-cat-zz9");
            assert_eq!(m.text, "ping");
            assert_eq!(m.room_id, room_id);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    let app = common::TestApp::spawn().await;
    let (_room_a, token_a) = app.create_room().await;
    let (_room_b, token_b) = app.create_room().await;

    app.post_message(&token_a, "fox", "in room a").await;

    let body: serde_json::Value = app.list_messages(&token_b).await.json().await.unwrap();
    assert!(body["messages"].as_array().unwrap().is_empty());

    // Destroying room B leaves room A untouched.
    app.destroy_room(&token_b).await;
    let body: serde_json::Value = app.list_messages(&token_a).await.json().await.unwrap();
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
}

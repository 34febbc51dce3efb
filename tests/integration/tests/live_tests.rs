//! Live notification feed over WebSocket
//!
//! Run with: cargo test -p integration-tests --test live_tests

use integration_tests::{assert_json, fixtures::*, TestServer};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test]
async fn test_snapshot_then_count_changes() {
    let server = TestServer::start().await.unwrap();
    let post = seed_post(&server.store, 1, ANA, "Weekend meetup", "Who is in?")
        .await
        .unwrap();

    let mut live = server.connect_live(ANA).await.unwrap();
    let snapshot = live.next_json().await.unwrap();
    assert_eq!(snapshot["type"], "SNAPSHOT");
    assert_eq!(snapshot["unread_count"], 0);
    assert!(snapshot["notifications"].as_array().unwrap().is_empty());

    server
        .post_as(&format!("/api/v1/posts/{post}/votes"), BOB, &VoteBody::like())
        .await
        .unwrap();
    assert_eq!(live.next_count().await.unwrap(), 1);

    let response = server.get_as("/api/v1/notifications", ANA).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    let id = body["notifications"][0]["id"].as_str().unwrap().to_string();

    server
        .post_empty_as(&format!("/api/v1/notifications/{id}/read"), ANA)
        .await
        .unwrap();
    assert_eq!(live.next_count().await.unwrap(), 0);

    live.close().await.unwrap();
}

#[tokio::test]
async fn test_snapshot_lists_existing_notifications() {
    let server = TestServer::start().await.unwrap();
    let post = seed_post(&server.store, 1, ANA, "Weekend meetup", "Who is in?")
        .await
        .unwrap();
    server
        .post_as(&format!("/api/v1/posts/{post}/votes"), CID, &VoteBody::like())
        .await
        .unwrap();

    let mut live = server.connect_live(ANA).await.unwrap();
    let snapshot = live.next_json().await.unwrap();
    assert_eq!(snapshot["unread_count"], 1);
    let notifications = snapshot["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "post-liked");
}

#[tokio::test]
async fn test_other_users_events_are_not_delivered() {
    let server = TestServer::start().await.unwrap();
    let bobs_post = seed_post(&server.store, 1, BOB, "Bob's post", "hello")
        .await
        .unwrap();
    let anas_post = seed_post(&server.store, 2, ANA, "Ana's post", "hello")
        .await
        .unwrap();

    let mut live = server.connect_live(ANA).await.unwrap();
    live.next_json().await.unwrap();

    // Only the second like concerns ana
    server
        .post_as(&format!("/api/v1/posts/{bobs_post}/votes"), CID, &VoteBody::like())
        .await
        .unwrap();
    server
        .post_as(&format!("/api/v1/posts/{anas_post}/votes"), CID, &VoteBody::like())
        .await
        .unwrap();

    assert_eq!(live.next_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_connected_users_receive_new_posts() {
    let server = TestServer::start().await.unwrap();
    let post = seed_post(&server.store, 1, BOB, "Game night", "Friday at eight")
        .await
        .unwrap();

    // Connecting marks ana online
    let mut live = server.connect_live(ANA).await.unwrap();
    live.next_json().await.unwrap();

    let response = server
        .post_empty_as(&format!("/api/v1/activity/posts/{post}"), BOB)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(body["created"], 1);

    assert_eq!(live.next_count().await.unwrap(), 1);

    let response = server.get_as("/api/v1/notifications", ANA).await.unwrap();
    let feed: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(feed["notifications"][0]["type"], "new-post");
}

#[tokio::test]
async fn test_closing_one_of_two_connections_keeps_user_online() {
    let server = TestServer::start().await.unwrap();
    let post = seed_post(&server.store, 1, BOB, "Game night", "Friday at eight")
        .await
        .unwrap();

    let mut first = server.connect_live(ANA).await.unwrap();
    first.next_json().await.unwrap();
    let mut second = server.connect_live(ANA).await.unwrap();
    second.next_json().await.unwrap();
    assert_eq!(server.store.session_count(ANA), 2);

    first.close().await.unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while server.store.session_count(ANA) != 1 {
        assert!(Instant::now() < deadline, "live session was not released");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let response = server
        .post_empty_as(&format!("/api/v1/activity/posts/{post}"), BOB)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(body["created"], 1);

    assert_eq!(second.next_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_live_feed_requires_a_valid_token() {
    let server = TestServer::start().await.unwrap();

    let url = format!("ws://{}/api/v1/notifications/live", server.addr);
    assert!(tokio_tungstenite::connect_async(url).await.is_err());

    let url = format!("ws://{}/api/v1/notifications/live?token=garbage", server.addr);
    assert!(tokio_tungstenite::connect_async(url).await.is_err());
}

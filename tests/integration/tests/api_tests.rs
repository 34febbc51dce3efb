//! API Integration Tests
//!
//! Each test starts its own server on an in-memory store, so no external
//! services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use agora_core::Snowflake;
use integration_tests::{
    assert_error, assert_json, assert_status, fixtures::*, TestServer,
};
use reqwest::StatusCode;
use serde_json::Value;

async fn unread_count(server: &TestServer, user: Snowflake) -> u64 {
    let response = server
        .get_as("/api/v1/notifications/unread-count", user)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    body["unread_count"].as_u64().unwrap()
}

async fn feed(server: &TestServer, user: Snowflake, query: &str) -> Vec<Value> {
    let response = server
        .get_as(&format!("/api/v1/notifications{query}"), user)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    body["notifications"].as_array().cloned().unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready_without_backends() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"], "disabled");
    assert_eq!(body["checks"]["redis"], "disabled");
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/api/v1/notifications").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "not-authorized");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let server = TestServer::start().await.unwrap();
    let response = server
        .client
        .get(format!("{}/api/v1/notifications", server.base_url()))
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "invalid-token");
}

// ============================================================================
// Vote Tests
// ============================================================================

#[tokio::test]
async fn test_like_toggle_notifies_author_once() {
    let server = TestServer::start().await.unwrap();
    let post = seed_post(&server.store, 1, ANA, "Weekend meetup", "Who is in?")
        .await
        .unwrap();
    let path = format!("/api/v1/posts/{post}/votes");

    let response = server.post_as(&path, BOB, &VoteBody::like()).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["likes"], 1);
    assert_eq!(body["dislikes"], 0);
    assert_eq!(body["state"], "liked");
    assert_eq!(body["entity_id"], post.to_string());

    // Second like toggles back to neutral
    let response = server.post_as(&path, BOB, &VoteBody::like()).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["likes"], 0);
    assert_eq!(body["state"], "neutral");

    // Liking again while the first notification is unread adds nothing
    let response = server.post_as(&path, BOB, &VoteBody::like()).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let notifications = feed(&server, ANA, "").await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "post-liked");
    assert_eq!(notifications[0]["actor_id"], BOB.to_string());
    assert_eq!(notifications[0]["related_id"], post.to_string());
    assert_eq!(unread_count(&server, ANA).await, 1);
}

#[tokio::test]
async fn test_dislike_then_remove() {
    let server = TestServer::start().await.unwrap();
    let post = seed_post(&server.store, 1, ANA, "Weekend meetup", "Who is in?")
        .await
        .unwrap();
    let reply = seed_reply(&server.store, 2, post, BOB, "Count me in")
        .await
        .unwrap();
    let path = format!("/api/v1/replies/{reply}/votes");

    let response = server.post_as(&path, CID, &VoteBody::dislike()).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["kind"], "reply");
    assert_eq!(body["dislikes"], 1);
    assert_eq!(body["state"], "disliked");

    let response = server.post_as(&path, CID, &VoteBody::remove()).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["dislikes"], 0);
    assert_eq!(body["state"], "neutral");

    // Reply votes never notify
    assert!(feed(&server, BOB, "").await.is_empty());
}

#[tokio::test]
async fn test_vote_errors() {
    let server = TestServer::start().await.unwrap();
    seed_post(&server.store, 1, ANA, "Weekend meetup", "Who is in?")
        .await
        .unwrap();

    let response = server
        .post_as("/api/v1/posts/1/votes", BOB, &serde_json::json!({ "kind": "love" }))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "validation-error");

    let response = server
        .post_as("/api/v1/posts/77/votes", BOB, &VoteBody::like())
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "post-not-found");

    let response = server
        .post_as("/api/v1/posts/abc/votes", BOB, &VoteBody::like())
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Reaction Tests
// ============================================================================

#[tokio::test]
async fn test_reactions_group_by_emoji() {
    let server = TestServer::start().await.unwrap();
    let message = seed_message(&server.store, 5, ANA, None, "Pizza tonight?")
        .await
        .unwrap();

    let response = server
        .put_as(&format!("/api/v1/messages/{message}/reactions/👍"), BOB)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["change"], "added");

    server
        .put_as(&format!("/api/v1/messages/{message}/reactions/👍"), CID)
        .await
        .unwrap();
    let response = server
        .put_as(&format!("/api/v1/messages/{message}/reactions/❤️"), BOB)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    let reactions = body["reactions"].as_array().unwrap();
    assert_eq!(reactions.len(), 2);
    assert_eq!(reactions[0]["emoji"], "👍");
    assert_eq!(reactions[0]["count"], 2);
    assert_eq!(reactions[1]["emoji"], "❤️");
    assert_eq!(reactions[1]["count"], 1);

    // One unread reaction notification per message
    let notifications = feed(&server, ANA, "").await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "message-reaction");

    // Toggling the same emoji removes it
    let response = server
        .put_as(&format!("/api/v1/messages/{message}/reactions/❤️"), BOB)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["change"], "removed");
    assert_eq!(body["reactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_only_moderators_remove_reactions_of_others() {
    let server = TestServer::start().await.unwrap();
    let message = seed_message(&server.store, 5, ANA, None, "Pizza tonight?")
        .await
        .unwrap();
    server
        .put_as(&format!("/api/v1/messages/{message}/reactions/👍"), BOB)
        .await
        .unwrap();

    let path = format!("/api/v1/messages/{message}/reactions/👍/{BOB}");

    let response = server.delete_as(&path, CID).await.unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "missing-capability");

    let response = server.delete_as(&path, MOD).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["change"], "removed");
    assert!(body["reactions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reaction_on_missing_message() {
    let server = TestServer::start().await.unwrap();
    let response = server
        .put_as("/api/v1/messages/404/reactions/👍", BOB)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "not-found");
}

// ============================================================================
// Notification Feed Tests
// ============================================================================

#[tokio::test]
async fn test_read_and_delete_lifecycle() {
    let server = TestServer::start().await.unwrap();
    let first = seed_post(&server.store, 1, ANA, "One", "first").await.unwrap();
    let second = seed_post(&server.store, 2, ANA, "Two", "second").await.unwrap();
    for post in [first, second] {
        server
            .post_as(&format!("/api/v1/posts/{post}/votes"), BOB, &VoteBody::like())
            .await
            .unwrap();
    }
    assert_eq!(unread_count(&server, ANA).await, 2);

    let notifications = feed(&server, ANA, "").await;
    let newest = notifications[0]["id"].as_str().unwrap().to_string();
    assert_eq!(notifications[0]["related_id"], second.to_string());

    // Someone else cannot touch it
    let response = server
        .post_empty_as(&format!("/api/v1/notifications/{newest}/read"), CID)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .post_empty_as(&format!("/api/v1/notifications/{newest}/read"), ANA)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(unread_count(&server, ANA).await, 1);

    let unread = feed(&server, ANA, "?unread_only=true").await;
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0]["related_id"], first.to_string());

    let response = server
        .post_empty_as("/api/v1/notifications/read-all", ANA)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
    assert_eq!(unread_count(&server, ANA).await, 0);
    assert!(feed(&server, ANA, "")
        .await
        .iter()
        .all(|n| n["read"] == true && n["read_at"].is_string()));

    let response = server
        .delete_as(&format!("/api/v1/notifications/{newest}"), ANA)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
    assert_eq!(feed(&server, ANA, "").await.len(), 1);

    let response = server
        .delete_as(&format!("/api/v1/notifications/{newest}"), ANA)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_feed_limit() {
    let server = TestServer::start().await.unwrap();
    for id in 1..=3 {
        let post = seed_post(&server.store, id, ANA, "Post", "body").await.unwrap();
        server
            .post_as(&format!("/api/v1/posts/{post}/votes"), BOB, &VoteBody::like())
            .await
            .unwrap();
    }

    assert_eq!(feed(&server, ANA, "?limit=2").await.len(), 2);
    assert_eq!(feed(&server, ANA, "").await.len(), 3);
}

// ============================================================================
// Activity Tests
// ============================================================================

#[tokio::test]
async fn test_post_mentions_fan_out() {
    let server = TestServer::start().await.unwrap();
    let post = seed_post(&server.store, 1, ANA, "Meetup", "Thanks @bob and @cid, also @ana and @nobody")
        .await
        .unwrap();

    let response = server
        .post_empty_as(&format!("/api/v1/activity/posts/{post}"), ANA)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(body["created"], 2);
    assert_eq!(body["failed"], 0);

    for user in [BOB, CID] {
        let notifications = feed(&server, user, "").await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0]["type"], "mention");
    }
    assert!(feed(&server, ANA, "").await.is_empty());

    // Announcing twice does not duplicate unread mentions
    let response = server
        .post_empty_as(&format!("/api/v1/activity/posts/{post}"), ANA)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(body["created"], 0);
    assert_eq!(body["existing"], 2);
}

#[tokio::test]
async fn test_reply_notifies_post_author() {
    let server = TestServer::start().await.unwrap();
    let post = seed_post(&server.store, 1, ANA, "Meetup", "Who is in?").await.unwrap();
    let reply = seed_reply(&server.store, 2, post, BOB, "Me! @ana @cid").await.unwrap();

    let response = server
        .post_empty_as(&format!("/api/v1/activity/replies/{reply}"), BOB)
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let ana = feed(&server, ANA, "").await;
    assert_eq!(ana.len(), 1);
    assert_eq!(ana[0]["type"], "new-reply");
    assert_eq!(ana[0]["payload"]["post_id"], post.to_string());

    let cid = feed(&server, CID, "").await;
    assert_eq!(cid.len(), 1);
    assert_eq!(cid[0]["type"], "mention");
}

#[tokio::test]
async fn test_only_the_author_announces() {
    let server = TestServer::start().await.unwrap();
    let message = seed_message(&server.store, 5, ANA, Some(BOB), "hi bob")
        .await
        .unwrap();

    let response = server
        .post_empty_as(&format!("/api/v1/activity/messages/{message}"), CID)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "not-authorized");

    let response = server
        .post_empty_as(&format!("/api/v1/activity/messages/{message}"), ANA)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(body["created"], 1);

    let bob = feed(&server, BOB, "").await;
    assert_eq!(bob[0]["type"], "new-message");
}

#[tokio::test]
async fn test_announcing_missing_content() {
    let server = TestServer::start().await.unwrap();
    let response = server
        .post_empty_as("/api/v1/activity/replies/99", ANA)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "reply-not-found");
}

//! Account and video record integration tests.
//!
//! Run with: `cargo test --test videos_test`

mod helpers;

use axum::http::StatusCode;
use helpers::{create_video, register_and_login, setup_test_app, TEST_PASSWORD};
use serde_json::json;
use tubely::models::Video;
use uuid::Uuid;

#[tokio::test]
async fn signup_rejects_duplicates_and_short_passwords() {
    let app = setup_test_app();
    let client = app.client();

    register_and_login(client, "walt@example.com").await;

    client
        .post("/api/users")
        .json(&json!({ "email": "WALT@example.com", "password": TEST_PASSWORD }))
        .await
        .assert_status(StatusCode::CONFLICT);

    let response = client
        .post("/api/users")
        .json(&json!({ "email": "jesse@example.com", "password": "123" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Password must be at least 6 characters long");
}

#[tokio::test]
async fn signup_response_omits_password_hash() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/users")
        .json(&json!({ "email": "skyler@example.com", "password": TEST_PASSWORD }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["email"], "skyler@example.com");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = setup_test_app();
    let client = app.client();
    register_and_login(client, "hank@example.com").await;

    for (email, password) in [
        ("hank@example.com", "wrong-password"),
        ("nobody@example.com", TEST_PASSWORD),
    ] {
        let response = client
            .post("/api/login")
            .json(&json!({ "email": email, "password": password }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Incorrect email or password");
    }
}

#[tokio::test]
async fn video_routes_require_a_token() {
    let app = setup_test_app();
    let client = app.client();

    client
        .post("/api/videos")
        .json(&json!({ "title": "Anonymous" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    client
        .get("/api/videos")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn created_videos_are_listed_for_their_owner_only() {
    let app = setup_test_app();
    let client = app.client();
    let marie = register_and_login(client, "marie@example.com").await;
    let todd = register_and_login(client, "todd@example.com").await;

    let first = create_video(client, &marie, "Minerals").await;
    let second = create_video(client, &marie, "More minerals").await;
    create_video(client, &todd, "Bikes").await;

    assert_eq!(first.user_id, marie.id);
    assert_eq!(first.thumbnail_url, None);

    let response = client
        .get("/api/videos")
        .authorization_bearer(&marie.token)
        .await;
    response.assert_status_ok();

    let videos: Vec<Video> = response.json();
    let ids: Vec<Uuid> = videos.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn create_video_requires_a_title() {
    let app = setup_test_app();
    let client = app.client();
    let user = register_and_login(client, "untitled@example.com").await;

    client
        .post("/api/videos")
        .authorization_bearer(&user.token)
        .json(&json!({ "title": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_video_returns_record_or_not_found() {
    let app = setup_test_app();
    let client = app.client();
    let user = register_and_login(client, "getter@example.com").await;
    let video = create_video(client, &user, "Findable").await;

    let response = client
        .get(&format!("/api/videos/{}", video.id))
        .authorization_bearer(&user.token)
        .await;
    response.assert_status_ok();
    let found: Video = response.json();
    assert_eq!(found, video);

    client
        .get(&format!("/api/videos/{}", Uuid::new_v4()))
        .authorization_bearer(&user.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    client
        .get("/api/videos/not-a-uuid")
        .authorization_bearer(&user.token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_the_owner_can_delete_a_video() {
    let app = setup_test_app();
    let client = app.client();
    let owner = register_and_login(client, "gus@example.com").await;
    let other = register_and_login(client, "mike@example.com").await;
    let video = create_video(client, &owner, "Los Pollos").await;
    let path = format!("/api/videos/{}", video.id);

    client
        .delete(&path)
        .authorization_bearer(&other.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    client
        .delete(&path)
        .authorization_bearer(&owner.token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    client
        .get(&path)
        .authorization_bearer(&owner.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_bodies_get_a_json_error() {
    let app = setup_test_app();
    let client = app.client();

    let response = client
        .post("/api/users")
        .bytes("{\"email\": ".into())
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));

    let user = register_and_login(client, "shapeless@example.com").await;
    let response = client
        .post("/api/videos")
        .authorization_bearer(&user.token)
        .json(&json!({ "description": "no title field" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].is_string());
}

mod common;

use auth::Claims;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

#[tokio::test]
async fn test_create_user_success() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/users")
        .json(&json!({
            "email": "Alice@Example.com",
            "password": "password",
            "name": "Alice"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 201);
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["name"], "Alice");
    assert!(body["data"]["id"].is_i64());
    assert!(body["data"]["created_at"].is_string());
    assert!(body["data"].get("password_hash").is_none());
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_create_user_duplicate_email() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice@example.com", "password").await;

    let response = app
        .post("/api/users")
        .json(&json!({
            "email": "ALICE@example.com",
            "password": "another-password"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));

    // The original account keeps its password and id.
    let token = app.login("alice@example.com", "password").await;

    let response = app
        .get_authenticated("/api/users", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    let users = body["data"].as_array().expect("Expected a list");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], alice["id"]);
    assert_eq!(users[0]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_create_user_invalid_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/users")
        .json(&json!({
            "email": "not-an-email",
            "password": "password"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("Invalid email"));
}

#[tokio::test]
async fn test_create_user_short_password() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/users")
        .json(&json!({
            "email": "alice@example.com",
            "password": "short"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_success_token_identifies_user() {
    let app = TestApp::spawn().await;
    let user = app.create_user("alice@example.com", "password").await;

    let token = app.login("alice@example.com", "password").await;

    let claims: Claims = app.jwt_handler.decode(&token).expect("Invalid token");
    assert_eq!(claims.user_id, user["id"].as_i64().unwrap());
    assert!(claims.exp > claims.iat);
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email_look_the_same() {
    let app = TestApp::spawn().await;
    app.create_user("alice@example.com", "password").await;

    let wrong_password = app
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to execute request");
    let unknown_email = app
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": "password" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let wrong_password: Value = wrong_password.json().await.expect("Failed to parse response");
    let unknown_email: Value = unknown_email.json().await.expect("Failed to parse response");
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(
        wrong_password["data"]["message"],
        "Incorrect email or password"
    );
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/users")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .get_authenticated("/api/users", "not.a.token")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let app = TestApp::spawn().await;
    app.create_user("alice@example.com", "password").await;

    let forged = auth::JwtHandler::new(b"some-other-secret-that-is-long-enough!!")
        .encode(&Claims::for_user(1, chrono::Duration::hours(1)))
        .unwrap();

    let response = app
        .get_authenticated("/api/auth/me", &forged)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::spawn().await;
    app.create_user("alice@example.com", "password").await;

    let expired = app
        .jwt_handler
        .encode(&Claims::for_user(1, chrono::Duration::hours(-1)))
        .unwrap();

    let response = app
        .get_authenticated("/api/users/1", &expired)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_current_user() {
    let app = TestApp::spawn().await;
    let user = app.create_user("alice@example.com", "password").await;
    let token = app.login("alice@example.com", "password").await;

    let response = app
        .get_authenticated("/api/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["id"], user["id"]);
    assert_eq!(body["data"]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_list_users() {
    let app = TestApp::spawn().await;
    app.create_user("alice@example.com", "password").await;
    app.create_user("bob@example.com", "password").await;
    let token = app.login("bob@example.com", "password").await;

    let response = app
        .get_authenticated("/api/users", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    let users = body["data"].as_array().expect("Expected a list");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["email"], "alice@example.com");
    assert_eq!(users[1]["email"], "bob@example.com");
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_get_user_not_found() {
    let app = TestApp::spawn().await;
    app.create_user("alice@example.com", "password").await;
    let token = app.login("alice@example.com", "password").await;

    let response = app
        .get_authenticated("/api/users/999", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .get_authenticated("/api/users/abc", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_password_changes_login() {
    let app = TestApp::spawn().await;
    let user = app.create_user("alice@example.com", "password").await;
    let token = app.login("alice@example.com", "password").await;

    let response = app
        .patch_authenticated(&format!("/api/users/{}", user["id"]), &token)
        .json(&json!({ "password": "new-password", "name": "Alice" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["name"], "Alice");
    assert_eq!(body["data"]["email"], "alice@example.com");

    let old = app
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "password" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    app.login("alice@example.com", "new-password").await;
}

#[tokio::test]
async fn test_update_email_to_taken_address_conflicts() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice@example.com", "password").await;
    app.create_user("bob@example.com", "password").await;
    let token = app.login("alice@example.com", "password").await;

    let response = app
        .patch_authenticated(&format!("/api/users/{}", alice["id"]), &token)
        .json(&json!({ "email": "bob@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_full_user_workflow() {
    let app = TestApp::spawn().await;
    let user = app.create_user("alice@example.com", "password").await;
    let path = format!("/api/users/{}", user["id"]);
    let token = app.login("alice@example.com", "password").await;

    let response = app
        .get_authenticated(&path, &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"], user);

    let response = app
        .delete_authenticated(&path, &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .get_authenticated(&path, &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .delete_authenticated(&path, &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

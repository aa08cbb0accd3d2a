mod common;

use common::TestApp;
use identity_service::config::PaginationConfig;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app.register("Alice", "alice@example.com", "secret1").await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 201);
    assert_eq!(body["message"], "success");
    assert_eq!(body["data"]["name"], "Alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["created_at"].is_string());
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_normalizes_email() {
    let app = TestApp::spawn().await;

    let response = app.register("Alice", "  Alice@Example.COM ", "secret1").await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;

    let first = app.register("Alice", "alice@example.com", "secret1").await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let response = app.register("Mallory", "ALICE@example.com", "other-secret").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 400);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
    assert!(body.get("data").is_none());

    // The first account is untouched
    let login = app.login("alice@example.com", "secret1").await;
    assert_eq!(login.status(), StatusCode::OK);
    let body: Value = login.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["user"]["name"], "Alice");

    let hijack = app.login("alice@example.com", "other-secret").await;
    assert_eq!(hijack.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = TestApp::spawn().await;

    let cases = [
        ("A", "alice@example.com", "secret1", "name"),
        ("Alice", "not-an-email", "secret1", "email"),
        ("Alice", "alice@example.com", "12345", "password"),
    ];

    for (name, email, password, field) in cases {
        let response = app.register(name, email, password).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{field}");

        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["code"], 400);
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .to_lowercase()
                .contains(field),
            "{body}"
        );
    }
}

#[tokio::test]
async fn test_register_malformed_body_uses_envelope() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/v1/register")
        .json(&json!({ "name": "Alice" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 400);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;
    app.register("Alice", "alice@example.com", "secret1").await;

    let response = app.login("Alice@Example.com", "secret1").await;

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");

    let token = body["data"]["token"].as_str().unwrap();
    let claims = app.jwt_handler.validate(token).expect("Token rejected");
    assert_eq!(claims.sub, body["data"]["user"]["id"].as_str().unwrap());
    assert_eq!(claims.email, "alice@example.com");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.register("Alice", "alice@example.com", "secret1").await;

    let wrong_password = app.login("alice@example.com", "secret2").await;
    let unknown_email = app.login("nobody@example.com", "secret1").await;
    let malformed_email = app.login("nobody", "secret1").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(malformed_email.status(), StatusCode::UNAUTHORIZED);

    let wrong_password = wrong_password.bytes().await.unwrap();
    let unknown_email = unknown_email.bytes().await.unwrap();
    let malformed_email = malformed_email.bytes().await.unwrap();

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password, malformed_email);

    let body: Value = serde_json::from_slice(&wrong_password).unwrap();
    assert_eq!(body, json!({"code": 401, "message": "Invalid credentials"}));
}

#[tokio::test]
async fn test_login_empty_password() {
    let app = TestApp::spawn().await;

    let response = app.login("alice@example.com", "").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_requires_header() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/v1/profile")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({"code": 401, "message": "Unauthorized"}));
}

#[tokio::test]
async fn test_profile_rejects_wrong_scheme() {
    let app = TestApp::spawn().await;
    let token = app
        .token_for("Alice", "alice@example.com", "secret1")
        .await;

    let response = app
        .get("/api/v1/profile")
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_looks_like_missing_header() {
    let app = TestApp::spawn().await;
    let token = app
        .token_for("Alice", "alice@example.com", "secret1")
        .await;
    let claims = app.jwt_handler.validate(&token).unwrap();

    let issued_at = chrono::Utc::now().timestamp() - 48 * 60 * 60;
    let expired = app
        .jwt_handler
        .issue_at(&claims.sub, &claims.email, issued_at)
        .unwrap();

    let missing = app
        .get("/api/v1/profile")
        .send()
        .await
        .expect("Failed to execute request");
    let rejected = app
        .get_authenticated("/api/v1/profile", &expired)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(missing.bytes().await.unwrap(), rejected.bytes().await.unwrap());
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let app = TestApp::spawn().await;
    let token = app
        .token_for("Alice", "alice@example.com", "secret1")
        .await;
    let claims = app.jwt_handler.validate(&token).unwrap();

    let forged = auth::JwtHandler::new(b"attacker-controlled-secret-32-bytes!")
        .issue(&claims.sub, &claims.email)
        .unwrap();

    let response = app
        .get_authenticated("/api/v1/profile", &forged)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_of_unknown_subject() {
    let app = TestApp::spawn().await;

    // Correctly signed, but nobody with this id was ever registered
    let token = app
        .jwt_handler
        .issue(uuid::Uuid::new_v4(), "ghost@example.com")
        .unwrap();

    let response = app
        .get_authenticated("/api/v1/profile", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_list_users_requires_header() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/v1/users")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_users_pagination() {
    let app = TestApp::spawn_with_pagination(PaginationConfig {
        default_limit: 2,
        max_limit: 3,
    })
    .await;

    let token = app
        .token_for("Alice", "alice@example.com", "secret1")
        .await;
    for i in 0..4 {
        app.register(&format!("User {}", i), &format!("user{}@example.com", i), "secret1")
            .await;
    }

    let fetch = |query: &'static str| {
        app.get_authenticated(&format!("/api/v1/users{}", query), &token)
            .send()
    };

    // Default page size
    let body: Value = fetch("").await.unwrap().json().await.unwrap();
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["email"], "alice@example.com");
    assert!(users[0].get("password_hash").is_none());

    // Offset skips in creation order
    let body: Value = fetch("?offset=2&limit=2").await.unwrap().json().await.unwrap();
    let emails: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, vec!["user1@example.com", "user2@example.com"]);

    // Oversized limit is clamped
    let body: Value = fetch("?limit=1000").await.unwrap().json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    // Past the end
    let body: Value = fetch("?offset=50").await.unwrap().json().await.unwrap();
    assert_eq!(body["code"], 200);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_users_invalid_query() {
    let app = TestApp::spawn().await;
    let token = app
        .token_for("Alice", "alice@example.com", "secret1")
        .await;

    for query in ["?limit=abc", "?offset=-1"] {
        let response = app
            .get_authenticated(&format!("/api/v1/users{}", query), &token)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{query}");
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["code"], 400);
    }
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/v1/nope")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_full_user_workflow() {
    let app = TestApp::spawn().await;

    // 1. Register
    let register = app.register("Alice", "a@x.com", "secret1").await;
    assert!(register.status().is_success());
    let register_body: Value = register.json().await.expect("Failed to parse response");
    let user_id = register_body["data"]["id"].as_str().unwrap().to_string();

    // 2. Login
    let login = app.login("a@x.com", "secret1").await;
    assert_eq!(login.status(), StatusCode::OK);
    let login_body: Value = login.json().await.expect("Failed to parse response");
    let token = login_body["data"]["token"].as_str().unwrap().to_string();

    // 3. Profile with the token
    let profile = app
        .get_authenticated("/api/v1/profile", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(profile.status(), StatusCode::OK);
    let profile_body: Value = profile.json().await.expect("Failed to parse response");
    assert_eq!(profile_body["data"]["id"], user_id.as_str());
    assert_eq!(profile_body["data"]["name"], "Alice");
    assert_eq!(profile_body["data"]["email"], "a@x.com");

    // 4. Profile with the token reversed
    let reversed: String = token.chars().rev().collect();
    let response = app
        .get_authenticated("/api/v1/profile", &reversed)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 5. Profile with one signature character changed
    let (head, signature) = token.rsplit_once('.').unwrap();
    let replacement = if signature.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{}.{}{}", head, replacement, &signature[1..]);
    let response = app
        .get_authenticated("/api/v1/profile", &tampered)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

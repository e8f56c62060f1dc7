//! API integration tests

use reqwest::Client;
use serde_json::{json, Value};

use crate::common::{admin_credentials, admin_token, create_member, unique_suffix, BASE_URL};

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();
    let (username, password) = admin_credentials();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let (username, _) = admin_credentials();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_refresh_token() {
    let client = Client::new();
    let (username, password) = admin_credentials();

    let body: Value = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let response = client
        .post(format!("{}/auth/refresh", BASE_URL))
        .json(&json!({ "refresh_token": body["refresh_token"] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // An access token is not accepted as a refresh token
    let response = client
        .post(format!("{}/auth/refresh", BASE_URL))
        .json(&json!({ "refresh_token": body["access_token"] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], admin_credentials().0);
    assert_eq!(body["is_staff"], true);
    assert!(body.get("password").is_none());
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_invalid_isbn_rejected() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Short",
            "author": "Nobody",
            "isbn": "12345"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_manage_catalog_or_users() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (_, member) = create_member(&client, &admin, "reader").await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&member)
        .json(&json!({
            "title": "Forbidden",
            "author": "Nobody",
            "isbn": "0000000000"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/users", BASE_URL))
        .bearer_auth(&member)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_grant_self_staff() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (id, member) = create_member(&client, &admin, "climber").await;

    let response = client
        .put(format!("{}/users/{}", BASE_URL, id))
        .bearer_auth(&member)
        .json(&json!({ "is_staff": true }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_search_wildcards_match_literally() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let suffix = unique_suffix();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": format!("Clearance {}% off", suffix),
            "author": "Anonymous",
            "isbn": format!("{:010}", suffix % 10_000_000_000)
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let search = |term: String| {
        let client = client.clone();
        let token = token.clone();
        async move {
            let body: Value = client
                .get(format!("{}/books", BASE_URL))
                .bearer_auth(&token)
                .query(&[("search", term)])
                .send()
                .await
                .expect("Failed to send request")
                .json()
                .await
                .expect("Failed to parse response");
            body["total"].as_i64().expect("No total")
        }
    };

    assert_eq!(search(format!("{}%", suffix)).await, 1);
    // `_` must not stand in for the `%` character
    assert_eq!(search(format!("{}_", suffix)).await, 0);
}

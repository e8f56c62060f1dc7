//! Shared helpers for the integration tests

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Client;
use serde_json::{json, Value};

pub const BASE_URL: &str = "http://localhost:8080/api/v1";

pub fn admin_credentials() -> (String, String) {
    (
        std::env::var("STACKS_TEST_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
        std::env::var("STACKS_TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "change-me-now".to_string()),
    )
}

/// Nanosecond clock reading, used to keep usernames and ISBNs unique across runs
pub fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

pub async fn login(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    assert!(response.status().is_success(), "login failed for {}", username);

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["access_token"]
        .as_str()
        .expect("No access token in response")
        .to_string()
}

pub async fn admin_token(client: &Client) -> String {
    let (username, password) = admin_credentials();
    login(client, &username, &password).await
}

/// Creates a fresh member account and returns (user id, access token)
pub async fn create_member(client: &Client, admin_token: &str, prefix: &str) -> (i64, String) {
    let suffix = unique_suffix();
    let username = format!("{}_{}", prefix, suffix);
    let password = "member-password";

    let response = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(admin_token)
        .json(&json!({
            "username": username,
            "email": format!("{}@example.org", username),
            "password": password
        }))
        .send()
        .await
        .expect("Failed to create member");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse user");
    let id = body["id"].as_i64().expect("No user id");

    let token = login(client, &username, password).await;
    (id, token)
}

/// Creates a book with a unique 13-character ISBN and returns its id
pub async fn create_book(client: &Client, admin_token: &str, copies: i32) -> i64 {
    let isbn = format!("{:013}", unique_suffix() % 10_000_000_000_000);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(admin_token)
        .json(&json!({
            "title": "The Left Hand of Darkness",
            "author": "Ursula K. Le Guin",
            "isbn": isbn,
            "published_date": "1969-03-01",
            "copies_available": copies
        }))
        .send()
        .await
        .expect("Failed to create book");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book");
    body["id"].as_i64().expect("No book id")
}

pub async fn copies_available(client: &Client, token: &str, book_id: i64) -> i64 {
    let body: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to fetch book")
        .json()
        .await
        .expect("Failed to parse book");

    body["copies_available"].as_i64().expect("No copies_available")
}

pub async fn checkout(client: &Client, token: &str, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/books/{}/checkout", BASE_URL, book_id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send checkout request")
}

pub async fn return_book(client: &Client, token: &str, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send return request")
}

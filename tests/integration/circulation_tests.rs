//! Checkout and return flows against a running server

use reqwest::Client;
use serde_json::Value;

use crate::common::{
    admin_token, checkout, copies_available, create_book, create_member, return_book, BASE_URL,
};

async fn transactions(client: &Client, token: &str, user_id: Option<i64>) -> Vec<Value> {
    let mut request = client
        .get(format!("{}/transactions", BASE_URL))
        .bearer_auth(token);
    if let Some(user_id) = user_id {
        request = request.query(&[("user_id", user_id)]);
    }

    let response = request.send().await.expect("Failed to send request");
    assert_eq!(response.status(), 200);
    response.json().await.expect("Failed to parse transactions")
}

#[tokio::test]
#[ignore]
async fn test_single_copy_lifecycle() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin, 1).await;
    let (user_a, alice) = create_member(&client, &admin, "alice").await;
    let (_, bob) = create_member(&client, &admin, "bob").await;

    let response = checkout(&client, &alice, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse transaction");
    assert_eq!(body["status"], "OUT");
    assert_eq!(body["status_display"], "Checked Out");
    assert_eq!(body["user"], user_a);
    assert_eq!(body["book"], book_id);
    assert!(body["returned_at"].is_null());
    assert_eq!(copies_available(&client, &alice, book_id).await, 0);

    // Nothing left on the shelf for Bob
    let response = checkout(&client, &bob, book_id).await;
    assert_eq!(response.status(), 400);
    let error: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(error["code"], 5);
    assert_eq!(error["message"], "No copies available.");
    assert_eq!(copies_available(&client, &alice, book_id).await, 0);

    let response = return_book(&client, &alice, book_id).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse transaction");
    assert_eq!(body["status"], "IN");
    assert_eq!(body["status_display"], "Returned");
    assert!(body["returned_at"].is_string());
    assert_eq!(copies_available(&client, &alice, book_id).await, 1);

    let response = checkout(&client, &bob, book_id).await;
    assert_eq!(response.status(), 201);
    assert_eq!(copies_available(&client, &bob, book_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_checkout_rejected() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin, 3).await;
    let (_, carol) = create_member(&client, &admin, "carol").await;

    assert_eq!(checkout(&client, &carol, book_id).await.status(), 201);

    let response = checkout(&client, &carol, book_id).await;
    assert_eq!(response.status(), 400);
    let error: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(error["code"], 6);
    assert_eq!(error["message"], "You already have this book checked out.");

    assert_eq!(copies_available(&client, &carol, book_id).await, 2);
}

#[tokio::test]
#[ignore]
async fn test_return_without_checkout_rejected() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin, 2).await;
    let (_, dave) = create_member(&client, &admin, "dave").await;

    let response = return_book(&client, &dave, book_id).await;
    assert_eq!(response.status(), 400);
    let error: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(error["code"], 7);
    assert_eq!(
        error["message"],
        "No active checkout of this book found for this user."
    );
    assert_eq!(copies_available(&client, &dave, book_id).await, 2);

    // A second return after a real one is refused the same way
    assert_eq!(checkout(&client, &dave, book_id).await.status(), 201);
    assert_eq!(return_book(&client, &dave, book_id).await.status(), 200);
    assert_eq!(return_book(&client, &dave, book_id).await.status(), 400);
    assert_eq!(copies_available(&client, &dave, book_id).await, 2);
}

#[tokio::test]
#[ignore]
async fn test_unknown_book_not_found() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let response = checkout(&client, &admin, i32::MAX as i64).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_checkouts_of_last_copy() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin, 1).await;
    let (_, erin) = create_member(&client, &admin, "erin").await;
    let (_, frank) = create_member(&client, &admin, "frank").await;

    let (first, second) = tokio::join!(
        checkout(&client, &erin, book_id),
        checkout(&client, &frank, book_id)
    );

    let mut statuses = vec![first.status().as_u16(), second.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![201, 400]);
    assert_eq!(copies_available(&client, &admin, book_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_duplicate_checkouts_by_same_user() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin, 5).await;
    let (user_id, grace) = create_member(&client, &admin, "grace").await;

    let (first, second) = tokio::join!(
        checkout(&client, &grace, book_id),
        checkout(&client, &grace, book_id)
    );

    let mut statuses = vec![first.status().as_u16(), second.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![201, 400]);
    assert_eq!(copies_available(&client, &admin, book_id).await, 4);

    let active: Vec<Value> = transactions(&client, &admin, Some(user_id))
        .await
        .into_iter()
        .filter(|t| t["book"] == book_id && t["status"] == "OUT")
        .collect();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_transaction_history_scoping() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let first_book = create_book(&client, &admin, 1).await;
    let second_book = create_book(&client, &admin, 1).await;
    let (heidi_id, heidi) = create_member(&client, &admin, "heidi").await;
    let (ivan_id, ivan) = create_member(&client, &admin, "ivan").await;

    assert_eq!(checkout(&client, &heidi, first_book).await.status(), 201);
    assert_eq!(return_book(&client, &heidi, first_book).await.status(), 200);
    assert_eq!(checkout(&client, &heidi, second_book).await.status(), 201);

    // Newest first
    let history = transactions(&client, &heidi, None).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["book"], second_book);
    assert_eq!(history[0]["status"], "OUT");
    assert_eq!(history[1]["book"], first_book);
    assert_eq!(history[1]["status"], "IN");

    // Members cannot look at someone else's history
    let own = transactions(&client, &ivan, Some(heidi_id)).await;
    assert!(own.iter().all(|t| t["user"] == ivan_id));
    assert!(own.is_empty());

    // Staff can
    let seen_by_staff = transactions(&client, &admin, Some(heidi_id)).await;
    assert_eq!(seen_by_staff.len(), 2);
}

#[tokio::test]
#[ignore]
async fn test_repeat_borrowing_only_sees_open_checkout() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin, 1).await;
    let (_, judy) = create_member(&client, &admin, "judy").await;

    for _ in 0..3 {
        assert_eq!(checkout(&client, &judy, book_id).await.status(), 201);
        assert_eq!(return_book(&client, &judy, book_id).await.status(), 200);
    }
    assert_eq!(return_book(&client, &judy, book_id).await.status(), 400);

    let history = transactions(&client, &judy, None).await;
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|t| t["status"] == "IN"));
    assert_eq!(copies_available(&client, &judy, book_id).await, 1);
}

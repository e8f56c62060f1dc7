//! Checkout, return and transaction history endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::transaction::{TransactionQuery, TransactionResponse},
    AppState,
};

use super::AuthenticatedUser;

/// Check a book out to the authenticated user
#[utoipa::path(
    post,
    path = "/books/{id}/checkout",
    tag = "circulation",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Book checked out", body = TransactionResponse),
        (status = 400, description = "No copies available or already checked out by this user", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn checkout_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<(StatusCode, Json<TransactionResponse>)> {
    let transaction = state
        .services
        .circulation
        .checkout(claims.user_id, book_id)
        .await?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}

/// Return a book checked out by the authenticated user
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "circulation",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = TransactionResponse),
        (status = 400, description = "No active checkout of this book", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<TransactionResponse>> {
    let transaction = state
        .services
        .circulation
        .return_book(claims.user_id, book_id)
        .await?;

    Ok(Json(transaction.into()))
}

/// Borrowing history, newest first
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "circulation",
    security(("bearer_auth" = [])),
    params(TransactionQuery),
    responses(
        (status = 200, description = "Transactions of the caller (or of `user_id` for staff)", body = Vec<TransactionResponse>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<TransactionQuery>,
) -> AppResult<Json<Vec<TransactionResponse>>> {
    let transactions = state
        .services
        .circulation
        .list_transactions(&claims, &query)
        .await?;

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

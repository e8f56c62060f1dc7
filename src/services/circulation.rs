//! Circulation service: checkouts, returns and borrowing history

use crate::{
    error::{AppError, AppResult},
    models::{
        transaction::{Transaction, TransactionQuery},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
}

impl CirculationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Check a book out to the calling user
    pub async fn checkout(&self, user_id: i32, book_id: i32) -> AppResult<Transaction> {
        self.require_active_user(user_id).await?;

        self.repository
            .transactions
            .checkout(user_id, book_id)
            .await
            .inspect_err(|e| {
                tracing::debug!("Checkout of book {} by user {} refused: {}", book_id, user_id, e)
            })
    }

    /// Return the calling user's open checkout of a book
    pub async fn return_book(&self, user_id: i32, book_id: i32) -> AppResult<Transaction> {
        self.repository
            .transactions
            .return_book(user_id, book_id)
            .await
            .inspect_err(|e| {
                tracing::debug!("Return of book {} by user {} refused: {}", book_id, user_id, e)
            })
    }

    /// Borrowing history. Staff may ask for another user's history.
    pub async fn list_transactions(
        &self,
        caller: &UserClaims,
        query: &TransactionQuery,
    ) -> AppResult<Vec<Transaction>> {
        let user_id = transactions_owner(caller, query);
        self.repository.transactions.list_for_user(user_id).await
    }

    async fn require_active_user(&self, user_id: i32) -> AppResult<()> {
        let user = self.repository.users.get_by_id(user_id).await?;
        if !user.is_active {
            return Err(AppError::Authorization("Account is disabled".to_string()));
        }
        Ok(())
    }
}

/// Whose transactions a listing shows: the caller, unless staff names someone else
fn transactions_owner(caller: &UserClaims, query: &TransactionQuery) -> i32 {
    match query.user_id {
        Some(user_id) if caller.is_staff => user_id,
        _ => caller.user_id,
    }
}

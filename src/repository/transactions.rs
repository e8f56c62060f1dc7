//! Transactions repository: checkout and return units of work
//!
//! Each operation runs in a single database transaction. The book row is
//! locked first, then the caller's open transaction row, so concurrent
//! checkouts and returns of the same book serialize on the book lock.

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use super::{books::BooksRepository, violated_constraint};
use crate::{
    circulation::{self, CirculationError, TransactionStatus},
    error::{AppError, AppResult},
    models::transaction::{Transaction, TransactionRow},
};

/// Partial unique index over (user_id, book_id) for status 'OUT'
const ONE_ACTIVE_CHECKOUT: &str = "transactions_one_active_checkout";

#[derive(Clone)]
pub struct TransactionsRepository {
    pool: Pool<Postgres>,
}

impl TransactionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All transactions of a user, newest first
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT * FROM transactions
            WHERE user_id = $1
            ORDER BY checked_out_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Check a book out to a user
    pub async fn checkout(&self, user_id: i32, book_id: i32) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let book = BooksRepository::lock(&mut *tx, book_id).await?;
        let mut ledger = book.ledger()?;
        let open = Self::find_open(&mut *tx, user_id, book_id).await?;

        let state = circulation::checkout(
            &mut ledger,
            open.as_ref().map(|t| &t.state),
            Utc::now(),
        )?;

        BooksRepository::store_copies(&mut *tx, book_id, ledger.copies_available()).await?;

        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (user_id, book_id, status, checked_out_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(state.status().as_code())
        .bind(state.checked_out_at())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some(ONE_ACTIVE_CHECKOUT) => CirculationError::DuplicateCheckout.into(),
            _ => AppError::Database(e),
        })?;

        tx.commit().await?;

        tracing::info!(
            "Checked out book {} to user {} ({} copies left)",
            book_id,
            user_id,
            ledger.copies_available()
        );

        Transaction::try_from(row)
    }

    /// Return a user's open checkout of a book
    pub async fn return_book(&self, user_id: i32, book_id: i32) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let book = BooksRepository::lock(&mut *tx, book_id).await?;
        let mut ledger = book.ledger()?;
        let open = Self::find_open(&mut *tx, user_id, book_id).await?;
        let open_id = open.as_ref().map(|t| t.id);

        let state = circulation::return_book(&mut ledger, open.map(|t| t.state), Utc::now())?;
        let transaction_id = open_id.ok_or(CirculationError::NoActiveCheckout)?;

        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            UPDATE transactions SET status = $2, returned_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(transaction_id)
        .bind(state.status().as_code())
        .bind(state.returned_at())
        .fetch_one(&mut *tx)
        .await?;

        BooksRepository::store_copies(&mut *tx, book_id, ledger.copies_available()).await?;

        tx.commit().await?;

        tracing::info!(
            "User {} returned book {} ({} copies available)",
            user_id,
            book_id,
            ledger.copies_available()
        );

        Transaction::try_from(row)
    }

    /// The user's open transaction for a book, row-locked
    async fn find_open(
        conn: &mut PgConnection,
        user_id: i32,
        book_id: i32,
    ) -> AppResult<Option<Transaction>> {
        sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT * FROM transactions
            WHERE user_id = $1 AND book_id = $2 AND status = $3
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(TransactionStatus::CheckedOut.as_code())
        .fetch_optional(conn)
        .await?
        .map(Transaction::try_from)
        .transpose()
    }
}

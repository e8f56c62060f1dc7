//! Circulation transaction model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::{
    circulation::{TransactionState, TransactionStatus},
    error::AppError,
};

/// Raw transaction row as stored
#[derive(Debug, Clone, FromRow)]
pub struct TransactionRow {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub status: String,
    pub checked_out_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

/// A checkout of one book by one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub state: TransactionState,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = AppError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let state = TransactionState::from_columns(&row.status, row.checked_out_at, row.returned_at)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Transaction {} has inconsistent status '{}' / returned_at {:?}",
                    row.id, row.status, row.returned_at
                ))
            })?;

        Ok(Transaction {
            id: row.id,
            user_id: row.user_id,
            book_id: row.book_id,
            state,
        })
    }
}

/// Transaction as exposed by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i32,
    /// User ID
    pub user: i32,
    /// Book ID
    pub book: i32,
    pub status: TransactionStatus,
    /// Human readable status
    pub status_display: String,
    pub checked_out_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        let status = tx.state.status();
        TransactionResponse {
            id: tx.id,
            user: tx.user_id,
            book: tx.book_id,
            status,
            status_display: status.label().to_string(),
            checked_out_at: tx.state.checked_out_at(),
            returned_at: tx.state.returned_at(),
        }
    }
}

/// Transaction list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct TransactionQuery {
    /// List another user's transactions (staff only, ignored otherwise)
    pub user_id: Option<i32>,
}

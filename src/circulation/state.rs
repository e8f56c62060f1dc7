//! Checkout state machine
//!
//! A borrowing relationship between one user and one book moves through
//! `NONE -> CHECKED_OUT -> RETURNED`. `NONE` is the absence of an active
//! transaction; `RETURNED` is terminal for that transaction, and a later
//! checkout of the same book by the same user opens a fresh one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CirculationError, Ledger};

/// Persisted status code of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TransactionStatus {
    #[serde(rename = "OUT")]
    CheckedOut,
    #[serde(rename = "IN")]
    Returned,
}

impl TransactionStatus {
    pub fn as_code(&self) -> &'static str {
        match self {
            TransactionStatus::CheckedOut => "OUT",
            TransactionStatus::Returned => "IN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionStatus::CheckedOut => "Checked Out",
            TransactionStatus::Returned => "Returned",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OUT" => Ok(TransactionStatus::CheckedOut),
            "IN" => Ok(TransactionStatus::Returned),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

/// Lifecycle of a single transaction.
///
/// A returned transaction always carries both timestamps, so "returned
/// without a return date" cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    CheckedOut {
        since: DateTime<Utc>,
    },
    Returned {
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    },
}

impl TransactionState {
    /// Rebuild a state from its stored columns. Returns `None` when the
    /// status code and the return timestamp disagree.
    pub fn from_columns(
        status: &str,
        checked_out_at: DateTime<Utc>,
        returned_at: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        match (status.parse::<TransactionStatus>().ok()?, returned_at) {
            (TransactionStatus::CheckedOut, None) => Some(TransactionState::CheckedOut {
                since: checked_out_at,
            }),
            (TransactionStatus::Returned, Some(until)) => Some(TransactionState::Returned {
                since: checked_out_at,
                until,
            }),
            _ => None,
        }
    }

    pub fn status(&self) -> TransactionStatus {
        match self {
            TransactionState::CheckedOut { .. } => TransactionStatus::CheckedOut,
            TransactionState::Returned { .. } => TransactionStatus::Returned,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TransactionState::CheckedOut { .. })
    }

    pub fn checked_out_at(&self) -> DateTime<Utc> {
        match *self {
            TransactionState::CheckedOut { since } | TransactionState::Returned { since, .. } => {
                since
            }
        }
    }

    pub fn returned_at(&self) -> Option<DateTime<Utc>> {
        match *self {
            TransactionState::CheckedOut { .. } => None,
            TransactionState::Returned { until, .. } => Some(until),
        }
    }

    /// `CHECKED_OUT -> RETURNED`. A transaction is returned at most once.
    pub fn mark_returned(self, at: DateTime<Utc>) -> Result<Self, CirculationError> {
        match self {
            TransactionState::CheckedOut { since } => {
                Ok(TransactionState::Returned { since, until: at })
            }
            TransactionState::Returned { .. } => Err(CirculationError::NoActiveCheckout),
        }
    }
}

/// Open a checkout of a book.
///
/// `active` is the caller's current open transaction for this book, if any.
/// On success the ledger has been decreased and the new transaction state is
/// returned; on failure the ledger is untouched.
pub fn checkout(
    ledger: &mut Ledger,
    active: Option<&TransactionState>,
    now: DateTime<Utc>,
) -> Result<TransactionState, CirculationError> {
    if !ledger.is_available() {
        return Err(CirculationError::BookUnavailable);
    }
    if active.is_some_and(TransactionState::is_active) {
        return Err(CirculationError::DuplicateCheckout);
    }

    ledger.decrease()?;
    Ok(TransactionState::CheckedOut { since: now })
}

/// Close the caller's open checkout of a book.
///
/// Returns are never blocked by the ledger: a book with zero copies on the
/// shelf goes back up to one.
pub fn return_book(
    ledger: &mut Ledger,
    active: Option<TransactionState>,
    now: DateTime<Utc>,
) -> Result<TransactionState, CirculationError> {
    let returned = active
        .ok_or(CirculationError::NoActiveCheckout)?
        .mark_returned(now)?;

    ledger.increase()?;
    Ok(returned)
}

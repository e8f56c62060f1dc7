//! Circulation core: the per-book inventory ledger and the checkout state machine.
//!
//! Everything here is pure and synchronous. The repository layer loads the
//! book (row-locked) and the open transaction inside one database
//! transaction, runs these transitions, and persists the outcome before
//! committing.

pub mod ledger;
pub mod state;

use thiserror::Error;

pub use ledger::Ledger;
pub use state::{checkout, return_book, TransactionState, TransactionStatus};

/// Reasons a checkout or return is refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CirculationError {
    #[error("No copies available.")]
    BookUnavailable,

    #[error("You already have this book checked out.")]
    DuplicateCheckout,

    #[error("No active checkout of this book found for this user.")]
    NoActiveCheckout,

    #[error("No available copies to check out.")]
    InventoryExhausted,

    #[error("{0}")]
    Validation(String),
}

//! Data models for Stacks

pub mod book;
pub mod transaction;
pub mod user;

// Re-export commonly used types
pub use book::Book;
pub use transaction::{Transaction, TransactionResponse};
pub use user::{User, UserClaims};

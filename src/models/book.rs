//! Book (catalog entry) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::circulation::{CirculationError, Ledger};

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    /// ISBN-10 or ISBN-13, unique across the catalog
    pub isbn: String,
    pub published_date: Option<NaiveDate>,
    /// Copies currently on the shelf
    pub copies_available: i32,
}

impl Book {
    /// Inventory ledger for this book's current copy count
    pub fn ledger(&self) -> Result<Ledger, CirculationError> {
        Ledger::new(self.copies_available)
    }
}

/// ISBN must be exactly 10 or 13 characters long
pub fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    match isbn.chars().count() {
        10 | 13 => Ok(()),
        _ => {
            let mut err = ValidationError::new("isbn_length");
            err.message = Some("ISBN must be 10 or 13 characters long.".into());
            Err(err)
        }
    }
}

/// Book list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Case-insensitive search in title, author and ISBN
    pub search: Option<String>,
    /// `true`, `1` or `yes` restricts to books with copies on the shelf
    pub available: Option<String>,
    /// Exact copy count
    pub copies_available: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl BookQuery {
    pub fn available_only(&self) -> bool {
        self.available
            .as_deref()
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false)
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Author must be 1 to 255 characters"))]
    pub author: String,
    #[validate(custom(function = "validate_isbn"))]
    pub isbn: String,
    pub published_date: Option<NaiveDate>,
    /// Defaults to 1
    #[validate(range(min = 0, message = "Copies available cannot be negative"))]
    pub copies_available: Option<i32>,
}

/// Update book request (only provided fields change)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Author must be 1 to 255 characters"))]
    pub author: Option<String>,
    #[validate(custom(function = "validate_isbn"))]
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "Copies available cannot be negative"))]
    pub copies_available: Option<i32>,
}

//! Books repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use super::{like_pattern, paginate, violated_constraint};
use crate::{
    circulation::CirculationError,
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

const ISBN_UNIQUE: &str = "books_isbn_key";
const COPIES_NON_NEGATIVE: &str = "books_copies_available_non_negative";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Search books with pagination, ordered by title
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let (_, per_page, offset) = paginate(query.page, query.per_page);
        let pattern = like_pattern(query.search.as_deref());
        let available_only = query.available_only();

        let filter = r#"
            WHERE ($1::text IS NULL
                   OR LOWER(title) LIKE $1 ESCAPE '\'
                   OR LOWER(author) LIKE $1 ESCAPE '\'
                   OR LOWER(isbn) LIKE $1 ESCAPE '\')
              AND ($2::int IS NULL OR copies_available = $2)
              AND (NOT $3 OR copies_available > 0)
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM books {}", filter))
            .bind(&pattern)
            .bind(query.copies_available)
            .bind(available_only)
            .fetch_one(&self.pool)
            .await?;

        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT * FROM books {} ORDER BY title, id LIMIT $4 OFFSET $5",
            filter
        ))
        .bind(&pattern)
        .bind(query.copies_available)
        .bind(available_only)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, published_date, copies_available)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.published_date)
        .bind(book.copies_available.unwrap_or(1))
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    /// Update an existing book (only provided fields change)
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn = COALESCE($4, isbn),
                published_date = COALESCE($5, published_date),
                copies_available = COALESCE($6, copies_available)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.published_date)
        .bind(book.copies_available)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book and its transaction history
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Load a book and hold its row lock until the surrounding transaction ends
    pub(crate) async fn lock(conn: &mut PgConnection, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Persist a ledger count inside the surrounding transaction
    pub(crate) async fn store_copies(
        conn: &mut PgConnection,
        id: i32,
        copies_available: i32,
    ) -> AppResult<()> {
        sqlx::query("UPDATE books SET copies_available = $2 WHERE id = $1")
            .bind(id)
            .bind(copies_available)
            .execute(conn)
            .await
            .map_err(|e| match violated_constraint(&e) {
                Some(COPIES_NON_NEGATIVE) => CirculationError::InventoryExhausted.into(),
                _ => AppError::Database(e),
            })?;
        Ok(())
    }
}

fn map_write_error(e: sqlx::Error) -> AppError {
    match violated_constraint(&e) {
        Some(ISBN_UNIQUE) => AppError::Conflict("A book with this ISBN already exists".to_string()),
        Some(COPIES_NON_NEGATIVE) => {
            CirculationError::Validation("Copies available cannot be negative".to_string()).into()
        }
        _ => AppError::Database(e),
    }
}

//! Users repository for database operations

use sqlx::{Pool, Postgres};

use super::{like_pattern, paginate, violated_constraint};
use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User, UserQuery},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username (authentication)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Whether at least one staff account exists
    pub async fn staff_exists(&self) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE is_staff)")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Search users with pagination, ordered by membership date
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        let (_, per_page, offset) = paginate(query.page, query.per_page);
        let pattern = like_pattern(query.search.as_deref());

        let filter = r#"
            WHERE ($1::text IS NULL
                   OR LOWER(username) LIKE $1 ESCAPE '\'
                   OR LOWER(email) LIKE $1 ESCAPE '\')
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {}", filter))
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM users {} ORDER BY date_of_membership, id LIMIT $2 OFFSET $3",
            filter
        ))
        .bind(&pattern)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((users, total))
    }

    /// Create a new user with an already hashed password
    pub async fn create(&self, user: &CreateUser, password_hash: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password, is_active, is_staff)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(user.is_active.unwrap_or(true))
        .bind(user.is_staff.unwrap_or(false))
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    /// Update an existing user (only provided fields change)
    pub async fn update(
        &self,
        id: i32,
        user: &UpdateUser,
        password_hash: Option<&str>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                password = COALESCE($4, password),
                is_active = COALESCE($5, is_active),
                is_staff = COALESCE($6, is_staff)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(user.is_active)
        .bind(user.is_staff)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Delete a user and their transaction history
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }
}

fn map_write_error(e: sqlx::Error) -> AppError {
    match violated_constraint(&e) {
        Some("users_username_key") => AppError::Conflict("Username already exists".to_string()),
        Some("users_email_key") => AppError::Conflict("Email already exists".to_string()),
        _ => AppError::Database(e),
    }
}

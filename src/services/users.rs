//! User management service

use validator::Validate;

use super::auth::hash_password;
use crate::{
    config::AdminConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User, UserClaims, UserQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Search users
    pub async fn search_users(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        self.repository.users.search(query).await
    }

    /// Create a new user
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()?;

        let password_hash = hash_password(&user.password)?;
        let created = self.repository.users.create(&user, &password_hash).await?;

        tracing::info!("Created user {} ({})", created.id, created.username);
        Ok(created)
    }

    /// Update a user. Only staff may change activation or staff flags.
    pub async fn update_user(
        &self,
        caller: &UserClaims,
        id: i32,
        user: UpdateUser,
    ) -> AppResult<User> {
        caller.require_self_or_staff(id)?;
        if user.changes_privileges() && !caller.is_staff {
            return Err(AppError::Authorization(
                "Only staff may change is_active or is_staff".to_string(),
            ));
        }
        user.validate()?;

        let password_hash = user.password.as_deref().map(hash_password).transpose()?;

        self.repository
            .users
            .update(id, &user, password_hash.as_deref())
            .await
    }

    /// Delete a user
    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.repository.users.delete(id).await?;
        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    /// Create the configured staff account if no staff user exists yet
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> AppResult<()> {
        if self.repository.users.staff_exists().await? {
            return Ok(());
        }

        let created = self
            .create_user(CreateUser {
                username: admin.username.clone(),
                email: admin.email.clone(),
                password: admin.password.clone(),
                is_active: Some(true),
                is_staff: Some(true),
            })
            .await?;

        tracing::warn!("Bootstrapped staff account '{}'", created.username);
        Ok(())
    }
}

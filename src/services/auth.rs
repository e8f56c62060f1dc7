//! Authentication service: password hashing and token issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{TokenKind, User, UserClaims},
    repository::Repository,
};

/// Access and refresh token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username and password
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&user.password, password)? {
            tracing::debug!("Rejected login for {}", username);
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        tracing::info!("User {} logged in", user.id);
        self.issue_tokens(&user)
    }

    /// Exchange a refresh token for a fresh token pair
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.decode(refresh_token, TokenKind::Refresh)?;

        // Re-read the user so deactivation and privilege changes take effect
        let user = self.repository.users.get_by_id(claims.user_id).await.map_err(|e| match e {
            AppError::NotFound(_) => AppError::Authentication("User no longer exists".to_string()),
            other => other,
        })?;

        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        self.issue_tokens(&user)
    }

    /// Validate a token of the expected kind
    pub fn decode(&self, token: &str, expected: TokenKind) -> AppResult<UserClaims> {
        let claims = UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        if claims.kind != expected {
            return Err(AppError::Authentication("Wrong token type".to_string()));
        }
        Ok(claims)
    }

    fn issue_tokens(&self, user: &User) -> AppResult<TokenPair> {
        let expires_in = self.config.access_token_minutes * 60;
        let access_token = self.sign(user, TokenKind::Access, expires_in)?;
        let refresh_token = self.sign(user, TokenKind::Refresh, self.config.refresh_token_hours * 3600)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in,
        })
    }

    fn sign(&self, user: &User, kind: TokenKind, ttl_seconds: i64) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            is_staff: user.is_staff,
            kind,
            exp: now + ttl_seconds,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}

/// Hash a password using Argon2 with a random salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

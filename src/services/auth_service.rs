//! Domain service for authentication and account management.
//!
//! Handles login, bearer-token issue/verify/revoke, and changes to the
//! caller's own credentials.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Covers both unknown email and wrong password; callers must not be
    /// able to distinguish the two.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Resolved caller identity attached to authenticated requests.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

/// User info DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Login result containing the minted bearer token and user info.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: UserInfo,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials, mints a bearer token, and returns it together
    /// with the user. Provisions the configured admin identity lazily on
    /// its first login attempt.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails, with no
    /// distinction between unknown email and wrong password.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Resolves a bearer token to the identity it was minted for. Expired
    /// or unknown tokens yield `None`; malformed input fails closed the
    /// same way.
    async fn verify_token(&self, token: &str) -> Result<Option<Identity>, AuthError>;

    /// Revokes a bearer token. Idempotent: unknown tokens are not an error.
    async fn logout(&self, token: &str) -> Result<(), AuthError>;

    /// Changes a user's password after verifying the current one, then
    /// revokes every outstanding token for that user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the current password is wrong
    /// or the new password is invalid.
    async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Changes a user's email address.
    async fn change_email(&self, user_id: &str, new_email: &str) -> Result<UserInfo, AuthError>;
}

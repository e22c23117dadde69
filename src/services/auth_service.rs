//! Domain service for accounts and authentication.
//!
//! Handles signup, activation, login, API key lookup, phone number changes
//! and account deletion.

use thiserror::Error;

use crate::models::User;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is not activated")]
    Inactive,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

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

/// A freshly registered, not yet activated account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    pub activation_token: String,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an inactive account and its empty profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for a malformed email, a short
    /// password or an email that is already taken.
    async fn register(&self, email: &str, password: &str) -> Result<Registration, AuthError>;

    /// Activates the account holding `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if no account holds the token.
    async fn activate(&self, token: &str) -> Result<(), AuthError>;

    /// Verifies credentials of an active account.
    async fn login(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Resolves an API key to its active account.
    async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>, AuthError>;

    /// Loads an active account by id.
    async fn get_user(&self, user_id: i32) -> Result<User, AuthError>;

    async fn update_phone(&self, user_id: i32, phone_number: &str) -> Result<User, AuthError>;

    /// Removes the account with everything it owns.
    async fn delete_account(&self, user_id: i32) -> Result<(), AuthError>;
}

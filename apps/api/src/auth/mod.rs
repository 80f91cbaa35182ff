//! Auth context: who is signed in, and the handle for signing in and out.
//!
//! Handlers never look the user up ambiently. The `CurrentUser` / `MaybeUser`
//! extractors resolve an immutable `AuthUser` snapshot from the bearer token,
//! and the `AuthProvider` in `AppState` carries the sign-in/sign-out operations.
//! Session storage and refresh stay with the hosted auth service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod extract;
pub mod gotrue;
pub mod handlers;

pub use extract::{CurrentUser, MaybeUser};
pub use gotrue::GoTrueProvider;

/// Snapshot of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    /// Account creation time; only known when fetched from the provider.
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// Result of a registration. Projects with email confirmation enabled hand back
/// the user without a session.
#[derive(Debug, Clone)]
pub enum SignUp {
    Session(AuthSession),
    ConfirmationRequired(AuthUser),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("invalid access token: {0}")]
    InvalidToken(String),

    #[error("auth provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("auth provider unreachable: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Validates an access token and returns the user it was issued to.
    async fn verify(&self, access_token: &str) -> Result<AuthUser, AuthError>;

    /// Full user record from the provider, including `created_at`.
    async fn fetch_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;
}

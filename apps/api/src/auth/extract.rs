use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

/// A verified user plus the token it came from (needed for sign-out and
/// provider lookups).
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: AuthUser,
    pub access_token: String,
}

/// Like `CurrentUser`, but anonymous visitors get `None` instead of a 401.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let user = state.auth.verify(token).await?;
        Ok(CurrentUser {
            user,
            access_token: token.to_string(),
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let Some(token) = bearer_token(parts) else {
            return Ok(MaybeUser(None));
        };
        match state.auth.verify(token).await {
            Ok(user) => Ok(MaybeUser(Some(CurrentUser {
                user,
                access_token: token.to_string(),
            }))),
            Err(e) => {
                tracing::debug!("Treating request as anonymous: {e}");
                Ok(MaybeUser(None))
            }
        }
    }
}

impl MaybeUser {
    pub fn user(&self) -> Option<&AuthUser> {
        self.0.as_ref().map(|c| &c.user)
    }
}

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{AuthSession, AuthUser, MaybeUser, SignUp};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::nav::{nav_links, NavItem, Route};
use crate::notice::Notice;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(AppError::Validation("A valid email is required".into()));
        }
        if self.password.is_empty() {
            return Err(AppError::Validation("Password is required".into()));
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub session: Option<AuthSession>,
    pub user: AuthUser,
    pub notice: Notice,
    pub redirect: &'static str,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: Option<AuthUser>,
    pub nav: Vec<NavItem>,
}

#[derive(Serialize)]
pub struct SignOutResponse {
    pub redirect: &'static str,
    pub nav: Vec<NavItem>,
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(req): AppJson<Credentials>,
) -> Result<Json<SignInResponse>, AppError> {
    req.validate()?;
    let session = state.auth.sign_in(req.email.trim(), &req.password).await?;
    info!("User {} signed in", session.user.id);

    Ok(Json(SignInResponse {
        user: session.user.clone(),
        session: Some(session),
        notice: Notice::success("Welcome back!"),
        redirect: Route::Home.path(),
    }))
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    AppJson(req): AppJson<Credentials>,
) -> Result<(StatusCode, Json<SignInResponse>), AppError> {
    req.validate()?;
    let response = match state.auth.sign_up(req.email.trim(), &req.password).await? {
        SignUp::Session(session) => {
            info!("Registered and signed in user {}", session.user.id);
            SignInResponse {
                user: session.user.clone(),
                session: Some(session),
                notice: Notice::success("Account created successfully!"),
                redirect: Route::Home.path(),
            }
        }
        SignUp::ConfirmationRequired(user) => {
            info!("Registered user {} pending email confirmation", user.id);
            SignInResponse {
                user,
                session: None,
                notice: Notice::info("Check your email to confirm your account"),
                redirect: Route::Login.path(),
            }
        }
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/logout
///
/// The client drops its session either way. A stale or missing token skips the
/// provider call; a provider failure is only logged.
pub async fn handle_logout(
    State(state): State<AppState>,
    MaybeUser(current): MaybeUser,
) -> Json<SignOutResponse> {
    match current {
        Some(current) => match state.auth.sign_out(&current.access_token).await {
            Ok(()) => info!("User {} signed out", current.user.id),
            Err(e) => warn!(
                "Sign-out for user {} not confirmed by provider: {e}",
                current.user.id
            ),
        },
        None => info!("Sign-out without a valid session"),
    }

    Json(SignOutResponse {
        redirect: Route::Login.path(),
        nav: nav_links(None),
    })
}

/// GET /api/v1/auth/session
pub async fn handle_session(current: MaybeUser) -> Json<SessionResponse> {
    let user = current.user().cloned();
    Json(SessionResponse {
        nav: nav_links(user.as_ref()),
        user,
    })
}

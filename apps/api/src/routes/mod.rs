pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::capsules::handlers as capsules;
use crate::nav;
use crate::profiles::handlers as profiles;
use crate::rewards::handlers as rewards;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth context
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route("/api/v1/auth/session", get(auth::handle_session))
        .route("/api/v1/nav", get(nav::handle_nav))
        // Capsules
        .route(
            "/api/v1/capsules",
            get(capsules::handle_list_capsules).post(capsules::handle_create_capsule),
        )
        .route(
            "/api/v1/capsules/:id",
            get(capsules::handle_get_capsule).patch(capsules::handle_edit_capsule),
        )
        .route(
            "/api/v1/capsules/:id/seal",
            post(capsules::handle_seal_capsule),
        )
        .route(
            "/api/v1/capsules/:id/release",
            post(capsules::handle_release_capsule),
        )
        .route(
            "/api/v1/capsules/:id/contents",
            get(capsules::handle_list_contents).post(capsules::handle_add_content),
        )
        // Profile
        .route(
            "/api/v1/profile",
            get(profiles::handle_get_profile).put(profiles::handle_update_profile),
        )
        .route("/api/v1/profile/avatar", get(profiles::handle_avatar))
        // Rewards
        .route("/api/v1/rewards", get(rewards::handle_get_rewards))
        .with_state(state)
}

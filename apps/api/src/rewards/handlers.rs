use axum::{extract::State, Json};

use crate::auth::CurrentUser;
use crate::errors::{AppError, BackendResultExt};
use crate::rewards::view::RewardsView;
use crate::state::AppState;

/// GET /api/v1/rewards
/// Read-only: nothing in the API grants tokens or achievements.
pub async fn handle_get_rewards(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<RewardsView>, AppError> {
    let rewards = state
        .backend
        .get_rewards(current.user.id)
        .await
        .or_notice("Error loading rewards")?;
    Ok(Json(RewardsView::build(rewards.as_ref())))
}

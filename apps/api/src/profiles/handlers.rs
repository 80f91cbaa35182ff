use axum::{extract::State, response::Redirect, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::CurrentUser;
use crate::dates::long_date;
use crate::errors::{AppError, BackendResultExt};
use crate::extract::AppJson;
use crate::models::profile::{Profile, ProfileUpsert};
use crate::notice::Notice;
use crate::state::AppState;

/// Editable fields, with nulls shown as empty strings.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub display_name: String,
    pub avatar_url: String,
    pub bio: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub member_since: Option<String>,
}

impl ProfileView {
    fn build(profile: Option<&Profile>, member_since: Option<String>) -> Self {
        ProfileView {
            display_name: profile
                .and_then(|p| p.display_name.clone())
                .unwrap_or_default(),
            avatar_url: profile
                .and_then(|p| p.avatar_url.clone())
                .unwrap_or_default(),
            bio: profile.and_then(|p| p.bio.clone()).unwrap_or_default(),
            updated_at: profile.map(|p| p.updated_at),
            member_since,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Serialize)]
pub struct UpdateProfileResponse {
    pub profile: ProfileView,
    pub notice: Notice,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<ProfileView>, AppError> {
    let profile = state
        .backend
        .get_profile(current.user.id)
        .await
        .or_notice("Error loading profile")?;

    let member_since = match state.auth.fetch_user(&current.access_token).await {
        Ok(user) => user.created_at.as_ref().map(long_date),
        Err(e) => {
            warn!("Could not fetch account age for {}: {e}", current.user.id);
            None
        }
    };

    Ok(Json(ProfileView::build(profile.as_ref(), member_since)))
}

/// PUT /api/v1/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, AppError> {
    let upsert = ProfileUpsert {
        id: current.user.id,
        display_name: blank_to_none(req.display_name),
        avatar_url: blank_to_none(req.avatar_url),
        bio: blank_to_none(req.bio),
        updated_at: Utc::now(),
    };

    let saved = state
        .backend
        .upsert_profile(upsert)
        .await
        .or_notice("Error updating profile")?;

    info!("Upserted profile for user {}", current.user.id);

    Ok(Json(UpdateProfileResponse {
        profile: ProfileView::build(Some(&saved), None),
        notice: Notice::success("Profile updated successfully"),
    }))
}

/// GET /api/v1/profile/avatar
/// Redirects to the stored avatar image, or to the placeholder when it would not load.
pub async fn handle_avatar(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Redirect, AppError> {
    let candidate = state
        .backend
        .get_profile(current.user.id)
        .await
        .or_notice("Error loading profile")?
        .and_then(|p| p.avatar_url);

    let source = state.avatars.resolve(candidate.as_deref()).await;
    Ok(Redirect::temporary(&source.src))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_missing_profile_renders_empty_fields() {
        let view = ProfileView::build(None, None);
        assert_eq!(view.display_name, "");
        assert_eq!(view.avatar_url, "");
        assert_eq!(view.bio, "");
        assert!(view.updated_at.is_none());
    }

    #[test]
    fn test_null_columns_render_empty() {
        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            display_name: Some("Ada".to_string()),
            avatar_url: None,
            bio: None,
            created_at: now,
            updated_at: now,
        };
        let view = ProfileView::build(Some(&profile), Some("May 1st, 2024".to_string()));
        assert_eq!(view.display_name, "Ada");
        assert_eq!(view.avatar_url, "");
        assert_eq!(view.member_since.as_deref(), Some("May 1st, 2024"));
    }

    #[test]
    fn test_blank_inputs_become_null() {
        assert_eq!(blank_to_none(Some("  ".to_string())), None);
        assert_eq!(blank_to_none(Some(" Ada ".to_string())), Some("Ada".to_string()));
        assert_eq!(blank_to_none(None), None);
    }
}

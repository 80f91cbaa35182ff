use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::capsules::filter::StatusFilter;
use crate::capsules::form::{AddContentRequest, CreateCapsuleRequest, EditCapsuleRequest};
use crate::capsules::lifecycle::{self, ensure_editable, ensure_readable};
use crate::capsules::view::{CapsuleCard, CapsuleListView};
use crate::dates::medium_date;
use crate::errors::{AppError, BackendResultExt};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::capsule::{Capsule, CapsuleContent, CapsuleStatus};
use crate::nav::Route;
use crate::notice::Notice;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: StatusFilter,
}

#[derive(Serialize)]
pub struct CapsuleMutationResponse {
    pub capsule: CapsuleCard,
    pub notice: Notice,
    pub redirect: Option<&'static str>,
}

#[derive(Serialize)]
pub struct ContentsResponse {
    pub capsule: CapsuleCard,
    pub contents: Vec<CapsuleContent>,
}

async fn load_owned(
    state: &AppState,
    current: &CurrentUser,
    id: Uuid,
    notice: &'static str,
) -> Result<Capsule, AppError> {
    state
        .backend
        .find_capsule(current.user.id, id)
        .await
        .or_notice(notice)?
        .ok_or_else(|| AppError::NotFound(format!("Capsule {id} not found")))
}

/// Persists a changed capsule, guarded on the status it was read with.
async fn save(
    state: &AppState,
    next: &Capsule,
    read_as: CapsuleStatus,
    notice: &'static str,
) -> Result<Capsule, AppError> {
    state
        .backend
        .update_capsule(next, read_as)
        .await
        .or_notice(notice)?
        .ok_or_else(|| {
            AppError::InvalidTransition(format!(
                "Capsule {} is no longer {read_as}; reload and try again",
                next.id
            ))
        })
}

/// GET /api/v1/capsules
pub async fn handle_list_capsules(
    State(state): State<AppState>,
    current: CurrentUser,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<CapsuleListView>, AppError> {
    let fetched = state
        .backend
        .list_capsules(current.user.id)
        .await
        .or_notice("Error loading capsules")?;
    Ok(Json(CapsuleListView::build(&fetched, query.status)))
}

/// POST /api/v1/capsules
pub async fn handle_create_capsule(
    State(state): State<AppState>,
    current: CurrentUser,
    AppJson(req): AppJson<CreateCapsuleRequest>,
) -> Result<(StatusCode, Json<CapsuleMutationResponse>), AppError> {
    let new = req.into_new_capsule(current.user.id)?;
    let capsule = state
        .backend
        .insert_capsule(new)
        .await
        .or_notice("Failed to create time capsule")?;

    info!("Created capsule {} for user {}", capsule.id, current.user.id);

    Ok((
        StatusCode::CREATED,
        Json(CapsuleMutationResponse {
            capsule: CapsuleCard::from(&capsule),
            notice: Notice::success("Time capsule created successfully!"),
            redirect: Some(Route::MyCapsules.path()),
        }),
    ))
}

/// GET /api/v1/capsules/:id
pub async fn handle_get_capsule(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<CapsuleCard>, AppError> {
    let capsule = load_owned(&state, &current, id, "Error loading capsule").await?;
    Ok(Json(CapsuleCard::from(&capsule)))
}

/// PATCH /api/v1/capsules/:id
pub async fn handle_edit_capsule(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<EditCapsuleRequest>,
) -> Result<Json<CapsuleMutationResponse>, AppError> {
    let capsule = load_owned(&state, &current, id, "Failed to update capsule").await?;
    ensure_editable(&capsule)?;

    let next = req.apply(&capsule, Utc::now())?;
    let saved = save(&state, &next, capsule.status, "Failed to update capsule").await?;

    info!("Updated draft capsule {id}");

    Ok(Json(CapsuleMutationResponse {
        capsule: CapsuleCard::from(&saved),
        notice: Notice::success("Capsule updated"),
        redirect: None,
    }))
}

/// POST /api/v1/capsules/:id/seal
pub async fn handle_seal_capsule(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<CapsuleMutationResponse>, AppError> {
    let capsule = load_owned(&state, &current, id, "Failed to seal capsule").await?;
    let sealed = lifecycle::seal(&capsule, Utc::now())?;
    let saved = save(&state, &sealed, capsule.status, "Failed to seal capsule").await?;

    info!("Sealed capsule {id} until {}", saved.release_date);

    Ok(Json(CapsuleMutationResponse {
        notice: Notice::success(format!(
            "Capsule sealed until {}",
            medium_date(&saved.release_date)
        )),
        capsule: CapsuleCard::from(&saved),
        redirect: None,
    }))
}

/// POST /api/v1/capsules/:id/release
pub async fn handle_release_capsule(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<CapsuleMutationResponse>, AppError> {
    let capsule = load_owned(&state, &current, id, "Failed to release capsule").await?;
    let released = lifecycle::release(&capsule, Utc::now())?;
    let saved = save(&state, &released, capsule.status, "Failed to release capsule").await?;

    info!("Released capsule {id}");

    Ok(Json(CapsuleMutationResponse {
        capsule: CapsuleCard::from(&saved),
        notice: Notice::success("Capsule released"),
        redirect: None,
    }))
}

/// POST /api/v1/capsules/:id/contents
pub async fn handle_add_content(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<AddContentRequest>,
) -> Result<(StatusCode, Json<CapsuleContent>), AppError> {
    let capsule = load_owned(&state, &current, id, "Failed to add content").await?;
    ensure_editable(&capsule)?;

    let new = req.into_new_content(capsule.id)?;
    let content = state
        .backend
        .insert_content(new)
        .await
        .or_notice("Failed to add content")?
        .ok_or_else(|| {
            AppError::InvalidTransition(format!(
                "Capsule {id} is no longer a draft; reload and try again"
            ))
        })?;

    info!(
        "Attached {} content {} to capsule {id}",
        content.content_type, content.id
    );

    Ok((StatusCode::CREATED, Json(content)))
}

/// GET /api/v1/capsules/:id/contents
pub async fn handle_list_contents(
    State(state): State<AppState>,
    current: CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ContentsResponse>, AppError> {
    let capsule = load_owned(&state, &current, id, "Error loading capsule contents").await?;
    ensure_readable(&capsule)?;

    let contents = state
        .backend
        .list_contents(capsule.id)
        .await
        .or_notice("Error loading capsule contents")?;

    Ok(Json(ContentsResponse {
        capsule: CapsuleCard::from(&capsule),
        contents,
    }))
}

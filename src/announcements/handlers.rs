use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    announcements::{dto::AnnouncementRequest, repo_types::Announcement},
    auth::{repo_types::User, services::AuthUser},
    errors::AppError,
    state::AppState,
};

pub fn announcement_routes() -> Router<AppState> {
    Router::new()
        .route("/announcements", get(list_announcements).post(create_announcement))
        .route(
            "/announcements/:id",
            put(update_announcement).delete(delete_announcement),
        )
}

async fn require_staff(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !user.is_staff {
        warn!(%user_id, "announcement change by non-staff user");
        return Err(AppError::Forbidden);
    }
    Ok(user)
}

async fn load_editable(state: &AppState, id: Uuid, user_id: Uuid) -> Result<Announcement, AppError> {
    let user = require_staff(state, user_id).await?;
    let announcement = Announcement::find(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Announcement not found".into()))?;
    if !announcement.editable_by(user.id, user.is_staff) {
        return Err(AppError::Forbidden);
    }
    Ok(announcement)
}

#[instrument(skip(state))]
pub async fn list_announcements(
    State(state): State<AppState>,
) -> Result<Json<Vec<Announcement>>, AppError> {
    Ok(Json(Announcement::list_active(&state.db).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_announcement(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>), AppError> {
    let user = require_staff(&state, user_id).await?;
    let payload = payload.validate()?;
    let announcement = Announcement::create(&state.db, user.id, &payload).await?;
    info!(announcement_id = %announcement.id, %user_id, "announcement created");
    Ok((StatusCode::CREATED, Json(announcement)))
}

#[instrument(skip(state, payload))]
pub async fn update_announcement(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnnouncementRequest>,
) -> Result<Json<Announcement>, AppError> {
    load_editable(&state, id, user_id).await?;
    let payload = payload.validate()?;
    Ok(Json(Announcement::update(&state.db, id, &payload).await?))
}

#[instrument(skip(state))]
pub async fn delete_announcement(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    load_editable(&state, id, user_id).await?;
    Announcement::delete(&state.db, id).await?;
    info!(announcement_id = %id, %user_id, "announcement deleted");
    Ok(StatusCode::NO_CONTENT)
}

use axum::{extract::State, routing::get, Json, Router};
use tracing::{info, instrument};

use crate::{
    auth::services::AuthUser,
    errors::AppError,
    profiles::repo_types::{Profile, UpdateProfileRequest},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(Profile::get_or_create(&state.db, user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    let bio = payload.bio.as_deref().map(str::trim).filter(|b| !b.is_empty());
    let profile = Profile::update_bio(&state.db, user_id, bio).await?;
    info!(%user_id, "profile updated");
    Ok(Json(profile))
}

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Html,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    errors::AppError,
    resumes::{
        dto::{Pagination, ResumeDetails, ResumeForm, ResumeListItem, SaveResumeRequest},
        render::render_preview,
        repo_types::Resume,
        services::{self, load_owned, MAX_PHOTO_BYTES},
    },
    sections::{blank_rows, edit_rows, ensure_sections, ResumeSection},
    state::AppState,
    templates::repo_types::ResumeTemplate,
};

// --- public routers ---

pub fn resume_routes() -> Router<AppState> {
    Router::new()
        .route("/resumes", get(list_resumes).post(create_resume))
        .route("/resumes/new", get(new_resume_form))
        .route(
            "/resumes/:id",
            get(edit_resume_form).put(update_resume).delete(delete_resume),
        )
        .route("/resumes/:id/clone", post(clone_resume))
        .route("/resumes/:id/preview", get(preview_resume))
}

pub fn photo_routes() -> Router<AppState> {
    Router::new()
        .route("/resumes/:id/photo", put(upload_photo).delete(remove_photo))
        .layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES + 64 * 1024))
}

async fn form_for(state: &AppState, resume: Resume, sections: &[ResumeSection]) -> ResumeForm {
    ResumeForm {
        resume: Some(services::details(state, resume).await),
        rows: edit_rows(sections),
    }
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_resumes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<ResumeListItem>>, AppError> {
    let resumes = Resume::list_by_user(&state.db, user_id, p.limit.clamp(1, 100), p.offset.max(0))
        .await?;
    Ok(Json(resumes.into_iter().map(ResumeListItem::from).collect()))
}

#[instrument]
pub async fn new_resume_form(AuthUser(_user_id): AuthUser) -> Json<ResumeForm> {
    Json(ResumeForm {
        resume: None,
        rows: blank_rows(),
    })
}

#[instrument(skip(state, payload))]
pub async fn create_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SaveResumeRequest>,
) -> Result<(StatusCode, HeaderMap, Json<ResumeForm>), AppError> {
    let (resume, sections) = services::create_resume(&state, user_id, payload).await?;

    let mut headers = HeaderMap::new();
    let location = HeaderValue::from_str(&format!("/api/v1/resumes/{}", resume.id))
        .map_err(|e| AppError::Internal(e.into()))?;
    headers.insert(header::LOCATION, location);

    Ok((
        StatusCode::CREATED,
        headers,
        Json(form_for(&state, resume, &sections).await),
    ))
}

#[instrument(skip(state))]
pub async fn edit_resume_form(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeForm>, AppError> {
    let resume = load_owned(&state.db, id, user_id).await?;
    let (sections, _) = ensure_sections(state.sections.as_ref(), resume.id).await?;
    Ok(Json(form_for(&state, resume, &sections).await))
}

#[instrument(skip(state, payload))]
pub async fn update_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveResumeRequest>,
) -> Result<Json<ResumeForm>, AppError> {
    let resume = load_owned(&state.db, id, user_id).await?;
    let (resume, sections) = services::update_resume(&state, resume, payload).await?;
    Ok(Json(form_for(&state, resume, &sections).await))
}

#[instrument(skip(state))]
pub async fn delete_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let resume = load_owned(&state.db, id, user_id).await?;
    services::delete_resume(&state, resume).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn clone_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ResumeForm>), AppError> {
    let source = load_owned(&state.db, id, user_id).await?;
    let (clone, sections) = services::clone_resume(&state, &source).await?;
    Ok((StatusCode::CREATED, Json(form_for(&state, clone, &sections).await)))
}

/// PUT /resumes/:id/photo (multipart, field `photo`)
#[instrument(skip(state, mp))]
pub async fn upload_photo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    mut mp: Multipart,
) -> Result<Json<ResumeDetails>, AppError> {
    let resume = load_owned(&state.db, id, user_id).await?;

    let mut upload = None;
    while let Some(field) = mp.next_field().await.map_err(|e| {
        warn!(error = %e, "multipart read failed");
        AppError::Validation("Malformed multipart body".into())
    })? {
        if field.name() != Some("photo") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let data = field.bytes().await.map_err(|e| {
            warn!(error = %e, "photo read failed");
            AppError::Validation("Photo must be at most 5 MB".into())
        })?;
        upload = Some((data, content_type));
        break;
    }
    let (data, content_type) =
        upload.ok_or_else(|| AppError::Validation("photo is required".into()))?;

    let resume = services::replace_photo(&state, resume, data, &content_type).await?;
    Ok(Json(services::details(&state, resume).await))
}

#[instrument(skip(state))]
pub async fn remove_photo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeDetails>, AppError> {
    let resume = load_owned(&state.db, id, user_id).await?;
    let resume = services::remove_photo(&state, resume).await?;
    Ok(Json(services::details(&state, resume).await))
}

#[instrument(skip(state))]
pub async fn preview_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let resume = load_owned(&state.db, id, user_id).await?;
    let (sections, _) = ensure_sections(state.sections.as_ref(), resume.id).await?;

    let template = match resume.template_id {
        Some(template_id) => ResumeTemplate::find(&state.db, template_id).await?,
        None => None,
    };
    let photo_url = services::photo_url(&state, &resume).await;

    Ok(Html(render_preview(
        &resume.title,
        photo_url.as_deref(),
        &sections,
        template.as_ref().map(|t| t.html_template.as_str()),
    )))
}

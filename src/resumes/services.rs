use bytes::Bytes;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    errors::AppError,
    resumes::{
        dto::{ResumeDetails, SaveResumeRequest},
        repo_types::Resume,
    },
    sections::{
        apply_submission, copy_sections, ensure_sections, validate_submission, ResumeSection,
        SectionStore,
    },
    state::AppState,
    storage::{ext_from_mime, photo_key},
    templates::repo_types::ResumeTemplate,
};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Trimmed title, non-empty and at most [`MAX_TITLE_LEN`] characters.
pub fn validate_title(raw: &str) -> Result<String, AppError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

pub fn clone_title(title: &str) -> String {
    format!("Copy of {title}").chars().take(MAX_TITLE_LEN).collect()
}

/// Loads a resume for `user_id`: unknown ids are 404, someone else's are 403.
pub async fn load_owned(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<Resume, AppError> {
    let resume = Resume::find(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".into()))?;
    if resume.user_id != user_id {
        warn!(resume_id = %id, %user_id, "resume owned by another user");
        return Err(AppError::Forbidden);
    }
    Ok(resume)
}

async fn check_template(db: &PgPool, template_id: Option<Uuid>) -> Result<(), AppError> {
    if let Some(id) = template_id {
        if ResumeTemplate::find(db, id).await?.is_none() {
            return Err(AppError::Validation("Unknown template".into()));
        }
    }
    Ok(())
}

/// Presigned photo link; a missing or unsignable photo yields `None`.
pub async fn photo_url(state: &AppState, resume: &Resume) -> Option<String> {
    let key = resume.photo_key.as_deref()?;
    match state
        .storage
        .presign_get(key, state.config.photo_url_ttl_secs)
        .await
    {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(error = %e, resume_id = %resume.id, "photo presign failed");
            None
        }
    }
}

pub async fn details(state: &AppState, resume: Resume) -> ResumeDetails {
    let photo_url = photo_url(state, &resume).await;
    ResumeDetails {
        id: resume.id,
        title: resume.title,
        template_id: resume.template_id,
        photo_url,
        created_at: resume.created_at,
        updated_at: resume.updated_at,
    }
}

/// Everything is validated before the resume row is written, so a rejected
/// request leaves no trace.
pub async fn create_resume(
    state: &AppState,
    user_id: Uuid,
    req: SaveResumeRequest,
) -> Result<(Resume, Vec<ResumeSection>), AppError> {
    let title = validate_title(&req.title)?;
    check_template(&state.db, req.template_id).await?;
    let edits = validate_submission(&[], &req.sections).map_err(AppError::Form)?;

    let resume = Resume::create(&state.db, user_id, &title, req.template_id, None).await?;
    if let Err(e) = state.sections.save_batch(resume.id, edits).await {
        if let Err(cleanup) = Resume::delete(&state.db, resume.id).await {
            warn!(error = %cleanup, resume_id = %resume.id, "orphan resume cleanup failed");
        }
        return Err(e.into());
    }
    let (sections, _) = ensure_sections(state.sections.as_ref(), resume.id).await?;

    info!(resume_id = %resume.id, %user_id, "resume created");
    Ok((resume, sections))
}

pub async fn update_resume(
    state: &AppState,
    resume: Resume,
    req: SaveResumeRequest,
) -> Result<(Resume, Vec<ResumeSection>), AppError> {
    let title = validate_title(&req.title)?;
    check_template(&state.db, req.template_id).await?;

    let sections = apply_submission(state.sections.as_ref(), resume.id, &req.sections).await?;
    let resume = Resume::update_meta(&state.db, resume.id, &title, req.template_id).await?;

    info!(resume_id = %resume.id, "resume updated");
    Ok((resume, sections))
}

/// Copies the source's sections onto the clone, then fills in missing types.
async fn clone_sections_onto(
    store: &dyn SectionStore,
    source_id: Uuid,
    clone_id: Uuid,
) -> anyhow::Result<Vec<ResumeSection>> {
    copy_sections(store, source_id, clone_id).await?;
    let (sections, _) = ensure_sections(store, clone_id).await?;
    Ok(sections)
}

pub async fn clone_resume(
    state: &AppState,
    source: &Resume,
) -> Result<(Resume, Vec<ResumeSection>), AppError> {
    let clone = Resume::create(
        &state.db,
        source.user_id,
        &clone_title(&source.title),
        source.template_id,
        source.photo_key.as_deref(),
    )
    .await?;
    let sections = match clone_sections_onto(state.sections.as_ref(), source.id, clone.id).await {
        Ok(sections) => sections,
        Err(e) => {
            if let Err(cleanup) = Resume::delete(&state.db, clone.id).await {
                warn!(error = %cleanup, resume_id = %clone.id, "orphan clone cleanup failed");
            }
            return Err(e.into());
        }
    };

    info!(source_id = %source.id, resume_id = %clone.id, "resume cloned");
    Ok((clone, sections))
}

pub async fn delete_resume(state: &AppState, resume: Resume) -> Result<(), AppError> {
    Resume::delete(&state.db, resume.id).await?;
    if let Some(key) = resume.photo_key {
        release_photo(state, &key).await;
    }
    info!(resume_id = %resume.id, "resume deleted");
    Ok(())
}

/// Validates and stores a new photo, then releases the previous one.
pub async fn replace_photo(
    state: &AppState,
    resume: Resume,
    body: Bytes,
    content_type: &str,
) -> Result<Resume, AppError> {
    let ext = ext_from_mime(content_type).ok_or_else(|| {
        AppError::Validation("Photo must be a JPEG, PNG or WebP image".into())
    })?;
    if body.is_empty() {
        return Err(AppError::Validation("Photo is empty".into()));
    }
    if body.len() > MAX_PHOTO_BYTES {
        return Err(AppError::Validation("Photo must be at most 5 MB".into()));
    }

    let key = photo_key(resume.user_id, resume.id, ext);
    state
        .storage
        .put_object(&key, body, content_type)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;
    let updated = Resume::set_photo(&state.db, resume.id, Some(&key)).await?;

    if let Some(old) = resume.photo_key {
        release_photo(state, &old).await;
    }
    info!(resume_id = %updated.id, key = %key, "resume photo stored");
    Ok(updated)
}

pub async fn remove_photo(state: &AppState, resume: Resume) -> Result<Resume, AppError> {
    let updated = Resume::set_photo(&state.db, resume.id, None).await?;
    if let Some(old) = resume.photo_key {
        release_photo(state, &old).await;
    }
    Ok(updated)
}

/// Best effort: the object is kept while another resume still points at it.
async fn release_photo(state: &AppState, key: &str) {
    match Resume::photo_in_use(&state.db, key).await {
        Ok(true) => {}
        Ok(false) => {
            if let Err(e) = state.storage.delete_object(key).await {
                warn!(error = %e, key, "photo delete failed");
            }
        }
        Err(e) => warn!(error = %e, key, "photo usage check failed"),
    }
}

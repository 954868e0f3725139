use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    errors::AppError,
    state::AppState,
    templates::{
        dto::{split_page, PageQuery, TemplateDetails, TemplatePage, TemplateSummary, TEMPLATES_PER_PAGE},
        repo_types::ResumeTemplate,
    },
};

pub fn template_routes() -> Router<AppState> {
    Router::new()
        .route("/templates", get(list_templates))
        .route("/templates/:id", get(get_template))
}

/// A missing or unsignable preview image is simply left out.
async fn preview_url(state: &AppState, key: Option<&str>) -> Option<String> {
    let key = key?;
    match state
        .storage
        .presign_get(key, state.config.photo_url_ttl_secs)
        .await
    {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(error = %e, key, "template preview presign failed");
            None
        }
    }
}

#[instrument(skip(state))]
pub async fn list_templates(
    State(state): State<AppState>,
    Query(q): Query<PageQuery>,
) -> Result<Json<TemplatePage>, AppError> {
    let rows = ResumeTemplate::list(&state.db, TEMPLATES_PER_PAGE + 1, q.offset()).await?;
    let (rows, has_next) = split_page(rows);

    let mut templates = Vec::with_capacity(rows.len());
    for t in rows {
        let preview_url = preview_url(&state, t.preview_image_key.as_deref()).await;
        templates.push(TemplateSummary {
            id: t.id,
            name: t.name,
            description: t.description,
            preview_url,
        });
    }

    Ok(Json(TemplatePage {
        templates,
        page: q.page.max(1),
        has_next,
    }))
}

#[instrument(skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TemplateDetails>, AppError> {
    let t = ResumeTemplate::find(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Template not found".into()))?;
    let preview_url = preview_url(&state, t.preview_image_key.as_deref()).await;
    Ok(Json(TemplateDetails {
        id: t.id,
        name: t.name,
        description: t.description,
        html_template: t.html_template,
        preview_url,
        created_at: t.created_at,
    }))
}
